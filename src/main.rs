// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr) and build the real fetcher / credential provider
// 3. Run the pipeline and print the result as a table or as JSON
// 4. Exit with proper code (0 = valid, 1 = validation failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use sitemap_sentinel::checker::{LinkCheckResult, LinkStatus};
use sitemap_sentinel::fetch::HttpFetcher;
use sitemap_sentinel::indexing::{FileCredentialProvider, SubmissionReport, SubmissionStatus};
use sitemap_sentinel::logging::init_logging;
use sitemap_sentinel::validate::{Severity, ValidationReport};
use sitemap_sentinel::{pipeline, PipelineResult};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Fetch, parse, credential and usage errors all end up here
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = sitemap valid (submission done if requested)
//   Ok(1) = validation failed
//   Err = the run could not complete
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let common = cli.command.common();
    let config = cli.command.config();

    init_logging(common.verbose)?;

    if !common.json {
        println!("🔍 Checking sitemap: {}", common.url);
    }

    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)?;
    let credentials = FileCredentialProvider::new(config.request_timeout);

    let result = pipeline::run(&common.url, &fetcher, &credentials, &config).await?;

    print_results(&result, common.json)?;

    Ok(result.exit_code())
}

// Prints the result either as a table or JSON
fn print_results(result: &PipelineResult, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_table(result);
    }
    Ok(())
}

// Prints the result as human-readable tables in the terminal
fn print_table(result: &PipelineResult) {
    if let Some(final_url) = &result.redirected_to {
        println!("🔀 Redirected to: {}", final_url);
    }
    println!("📄 {} with {} entr{}\n", result.kind, result.entry_count, plural(result.entry_count));

    print_issues(&result.validation);

    for child in &result.children {
        println!("\n📂 Child sitemap: {}", child.sitemap_url);
        print_issues(&child.validation);
    }

    if let Some(checks) = &result.link_checks {
        println!();
        print_link_checks(checks);
    }

    if let Some(submission) = &result.submission {
        println!();
        if submission.is_empty() && result.index_not_expanded() {
            println!("⚠️  Sitemap index not expanded: nothing was submitted (use --expand-index)");
        } else {
            print_submission(submission);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   📋 Entries: {}", result.entry_count);
    if !result.children.is_empty() {
        let unusable = result.children.iter().filter(|c| !c.is_valid()).count();
        println!("   📂 Child sitemaps: {} ({} with errors)", result.children.len(), unusable);
    }
    println!("   ❌ Errors: {}", result.validation.error_count());
    println!("   ⚠️  Warnings: {}", result.validation.warning_count());
    if let Some(submission) = &result.submission {
        println!("   📤 Submitted: {}", submission.submitted());
        println!("   ⏭️  Skipped: {}", submission.skipped());
        println!("   💥 Failed: {}", submission.failed());
    }

    if result.is_valid() {
        println!("\n✅ Sitemap is valid");
    } else {
        println!("\n❌ Sitemap is invalid");
    }
}

fn print_issues(report: &ValidationReport) {
    if report.issues().is_empty() {
        println!("✅ No issues found");
        return;
    }

    println!("{:<12} {:<12} {:<26} {}", "SCOPE", "SEVERITY", "CODE", "MESSAGE");
    println!("{}", "=".repeat(105));

    for issue in report.issues() {
        let severity = match issue.severity {
            Severity::Error => "❌ ERROR",
            Severity::Warning => "⚠️  WARNING",
        };
        println!(
            "{:<12} {:<12} {:<26} {}",
            issue.scope.to_string(),
            severity,
            issue.code.as_str(),
            issue.message
        );
    }
}

fn print_link_checks(results: &[LinkCheckResult]) {
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    for result in results {
        let message = result.message.as_deref().unwrap_or("");
        println!(
            "{:<60} {:<15} {:<30}",
            truncate(&result.url, 57),
            format_status(&result.status),
            message
        );
    }

    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    println!("\n🌐 Reachable: {} / {}", ok_count, results.len());
}

fn print_submission(report: &SubmissionReport) {
    println!("{:<60} {:<15} {:<30}", "URL", "SUBMISSION", "REASON");
    println!("{}", "=".repeat(105));

    for outcome in report.outcomes() {
        let status = match outcome.status {
            SubmissionStatus::Submitted => "✅ SUBMITTED",
            SubmissionStatus::Skipped => "⏭️  SKIPPED",
            SubmissionStatus::Failed => "❌ FAILED",
        };
        println!(
            "{:<60} {:<15} {:<30}",
            truncate(&outcome.location, 57),
            status,
            outcome.failure_reason.as_deref().unwrap_or("")
        );
    }
}

// Truncates on a character boundary so multi-byte URLs never panic
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn format_status(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Ok => "✅ OK".to_string(),
        LinkStatus::Redirect(_) => "🔀 REDIRECT".to_string(),
        LinkStatus::Broken => "❌ BROKEN".to_string(),
        LinkStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkStatus::SslError => "🔒 SSL ERROR".to_string(),
        LinkStatus::TooManyRedirects => "🔁 TOO MANY REDIRECTS".to_string(),
        LinkStatus::DnsError => "🌐 DNS ERROR".to_string(),
        LinkStatus::Error => "⚠️  ERROR".to_string(),
    }
}
