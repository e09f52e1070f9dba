use {
    colored::{ColoredString, Colorize},
    indicatif::{ProgressBar, ProgressStyle},
    std::time::Duration,
};

/// Print a grey colored line to separate sections
pub(crate) fn separator() -> ColoredString {
    "\n-=-=-=-=-=-=-=-\n".truecolor(100, 100, 100)
}

/// Print the title of the currently executed command.
#[macro_export]
macro_rules! command_title {
    ($title:expr) => {
        println!(
            "{arrow} {title}{separator}",
            arrow = "▶".bold().purple(),
            title = format!($title).bold(),
            separator = separator()
        );
    };
}

/// Spinner shown while a slow step runs; finish with `success` or `error`.
pub(crate) struct LoadingHandle {
    bar: ProgressBar,
    message: String,
}

impl LoadingHandle {
    pub(crate) fn success(self) {
        self.bar
            .finish_with_message(format!("{} {}", "✔".green().bold(), self.message));
    }

    pub(crate) fn error(self) {
        self.bar
            .finish_with_message(format!("{} {}", "✘".red().bold(), self.message));
    }
}

pub(crate) fn loading(message: String) -> LoadingHandle {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template must parse"),
    );
    bar.set_message(message.clone());
    bar.enable_steady_tick(Duration::from_millis(100));
    LoadingHandle { bar, message }
}

/// Shorthand around [`loading`] with `format!` arguments.
#[macro_export]
macro_rules! loading {
    ($($arg:tt)*) => {
        $crate::display::loading(format!($($arg)*))
    };
}
