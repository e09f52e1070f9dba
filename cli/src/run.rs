use {
    crate::{command_title, loading, prelude::*, utils::load_proof_keys},
    std::time::Duration,
    wopitest_sdk::{
        client::DEFAULT_USER_AGENT,
        CaseExecutor,
        CaseResult,
        CaseStatus,
        Catalog,
        CategoryFilter,
        RunConfig,
        RunSummary,
        TestFilter,
        WopiClient,
    },
};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub(crate) enum CategoryArg {
    #[default]
    All,
    WopiCore,
    OfficeNativeClient,
    OfficeOnline,
}

impl From<CategoryArg> for CategoryFilter {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => Self::All,
            CategoryArg::WopiCore => Self::WopiCore,
            CategoryArg::OfficeNativeClient => Self::OfficeNativeClient,
            CategoryArg::OfficeOnline => Self::OfficeOnline,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    #[arg(
        long = "wopi-endpoint",
        short = 'w',
        help = "WOPI file endpoint URL to exercise",
        value_name = "URL"
    )]
    endpoint: Option<String>,

    #[arg(
        long = "access-token",
        short = 't',
        help = "Access token for the target file",
        value_name = "TOKEN"
    )]
    access_token: Option<String>,

    #[arg(
        long = "token-ttl",
        short = 'l',
        help = "Access-token TTL in seconds; doubles as the HTTP timeout",
        value_name = "SECONDS"
    )]
    token_ttl: Option<u64>,

    #[arg(
        long = "test-name",
        short = 'n',
        help = "Run the single test case with this name",
        value_name = "NAME"
    )]
    test_name: Option<String>,

    #[arg(
        long = "test-category",
        short = 'c',
        help = "Restrict to a test category",
        value_enum,
        default_value_t = CategoryArg::All
    )]
    category: CategoryArg,

    #[arg(
        long = "test-group",
        short = 'g',
        help = "Restrict to a test group (case-insensitive)",
        value_name = "GROUP"
    )]
    test_group: Option<String>,

    #[arg(
        long = "catalog",
        short = 'r',
        help = "Path to the test catalog XML",
        default_value = "TestCases.xml",
        value_name = "PATH"
    )]
    catalog: PathBuf,

    #[arg(
        long = "ignore-skipped",
        help = "Exit zero even when cases were skipped"
    )]
    ignore_skipped: bool,

    #[arg(
        long = "proof-key",
        help = "PEM file with the current RSA proof key",
        value_name = "PEM"
    )]
    proof_key: Option<PathBuf>,

    #[arg(
        long = "old-proof-key",
        help = "PEM file with the previous RSA proof key",
        value_name = "PEM"
    )]
    old_proof_key: Option<PathBuf>,

    #[arg(long = "user-agent", help = "Override the default User-Agent")]
    user_agent: Option<String>,
}

/// Run the selected cases and reduce the results to a process exit code.
pub(crate) async fn run_tests(args: RunArgs) -> Result<i32, WopitestCliError> {
    let conf = CliConf::load().map_err(WopitestCliError::Any)?;

    let endpoint = args.endpoint.or(conf.endpoint).ok_or_else(|| {
        WopitestCliError::Any(anyhow!(
            "A WOPI endpoint is required; pass -w or set it in {CLI_CONF_PATH}"
        ))
    })?;
    let access_token = args.access_token.or(conf.access_token).ok_or_else(|| {
        WopitestCliError::Any(anyhow!(
            "An access token is required; pass -t or set it in {CLI_CONF_PATH}"
        ))
    })?;
    let access_token_ttl = args.token_ttl.or(conf.access_token_ttl).unwrap_or(3600);
    let user_agent = args
        .user_agent
        .or(conf.user_agent)
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    command_title!("Running WOPI conformance cases against '{endpoint}'");

    let catalog_handle = loading!("Loading test catalog '{}'...", args.catalog.display());
    let catalog = match Catalog::from_path(&args.catalog) {
        Ok(catalog) => {
            catalog_handle.success();
            catalog
        }
        Err(e) => {
            catalog_handle.error();
            return Err(WopitestCliError::Catalog(e));
        }
    };

    let proof_keys = load_proof_keys(
        args.proof_key.or(conf.proof_key).as_deref(),
        args.old_proof_key.or(conf.old_proof_key).as_deref(),
    )?;

    let client = WopiClient::new(Duration::from_secs(access_token_ttl))
        .map_err(WopitestCliError::Http)?;

    let filter = TestFilter {
        name: args.test_name,
        category: args.category.into(),
        group: args.test_group,
    };
    let scheduled = filter.select(&catalog.groups);
    if scheduled.is_empty() {
        println!("{}", "No test cases matched the filter.".yellow());
        return Ok(0);
    }

    let config = RunConfig {
        endpoint,
        access_token,
        access_token_ttl,
        user_agent,
    };
    let executor = CaseExecutor {
        client: &client,
        resources: &catalog.resources,
        proof_keys: &proof_keys,
        prereq_cases: &catalog.prereq_cases,
        config: &config,
    };

    let mut summary = RunSummary::default();
    let mut current_group = None;
    for entry in scheduled {
        if current_group != Some(entry.group) {
            println!("\n{}", entry.group.bold());
            current_group = Some(entry.group);
        }
        let result = executor.execute_case(entry.group, entry.case).await;
        print_case(&result);
        summary.push(result);
    }

    print_summary(&summary);
    Ok(if summary.success(args.ignore_skipped) { 0 } else { 1 })
}

fn print_case(result: &CaseResult) {
    match result.status {
        CaseStatus::Pass => {
            println!("  {} {}", "✔".green().bold(), result.case_name);
        }
        CaseStatus::Skipped => {
            println!(
                "  {} {} {}",
                "~".yellow().bold(),
                result.case_name,
                "(prerequisite unmet)".yellow()
            );
        }
        CaseStatus::Fail => {
            println!("  {} {}", "✘".red().bold(), result.case_name.red());
            if let Some(message) = &result.fail_message {
                println!("      {message}");
            }
            for (request, failure) in result.gating_failures() {
                println!("      {}: {failure}", request.dimmed());
            }
            if let Some(link) = &result.documentation_link {
                println!("      {} {link}", "see docs:".dimmed());
            }
            if let Some(screenshot) = &result.ui_screenshot {
                println!("      {} {screenshot}", "expected UI:".dimmed());
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("{}", separator());
    for group in summary.groups() {
        println!(
            "{group}: {} passed, {} failed, {} skipped",
            summary.count_in_group(group, CaseStatus::Pass),
            summary.count_in_group(group, CaseStatus::Fail),
            summary.count_in_group(group, CaseStatus::Skipped),
        );
    }

    let failed = summary.count(CaseStatus::Fail);
    let skipped = summary.count(CaseStatus::Skipped);
    let total = format!(
        "Total: {} passed, {failed} failed, {skipped} skipped",
        summary.count(CaseStatus::Pass),
    );
    if failed > 0 {
        println!("\n{}", total.red().bold());
    } else if skipped > 0 {
        println!("\n{}", total.yellow().bold());
    } else {
        println!("\n{}", total.green().bold());
    }
}
