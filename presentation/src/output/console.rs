//! Console output formatter for scoring and payment reports

use colored::Colorize;
use crowdcontrol_application::{ConfigIssue, PaymentReport, ScoringReport, Severity};
use crowdcontrol_domain::{AlgorithmInfo, AnswerScore, ExperimentId, Worker};
use serde::Serialize;

/// Formats reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a scoring run; `full` adds clusters and per-answer scores
    pub fn format_scoring(report: &ScoringReport, full: bool) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!(
            "Experiment {} Scoring",
            report.experiment
        )));
        output.push('\n');

        let scored = report.answers.len() - report.unscored_count();
        output.push_str(&format!(
            "{} {} cluster(s), {} duplicate(s), {} comparison(s)\n",
            "Duplicates:".cyan().bold(),
            report.duplicates.clusters.len(),
            report.duplicates.duplicate_count(),
            report.duplicates.comparisons
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Ratings scored:".cyan().bold(),
            report.ratings_scored
        ));
        output.push_str(&format!(
            "{} {} scored, {} without good ratings, {} already final\n",
            "Answers:".cyan().bold(),
            scored,
            report.unscored_count(),
            report.skipped_assured
        ));

        if full {
            if !report.duplicates.clusters.is_empty() {
                output.push_str(&Self::section_header("Duplicate Clusters"));
                for cluster in &report.duplicates.clusters {
                    let duplicates = cluster
                        .duplicates
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    output.push_str(&format!(
                        "  answer {} kept, duplicates: {}\n",
                        cluster.representative.to_string().bold(),
                        duplicates
                    ));
                }
            }

            if !report.answers.is_empty() {
                output.push_str(&Self::section_header("Answer Qualities"));
                for scored in &report.answers {
                    let line = match scored.score {
                        AnswerScore::Scored {
                            quality,
                            ratings_used,
                        } => format!(
                            "  answer {:>4}: quality {} from {} good rating(s)",
                            scored.answer,
                            quality.to_string().green().bold(),
                            ratings_used
                        ),
                        AnswerScore::Unscored => format!(
                            "  answer {:>4}: {}",
                            scored.answer,
                            "no good ratings".dimmed()
                        ),
                    };
                    output.push_str(&line);
                    output.push('\n');
                }
            }

            for diagnostic in &report.duplicates.diagnostics {
                output.push_str(&format!("  {} {}\n", "note:".yellow(), diagnostic));
            }
        }

        if !report.failures.is_empty() {
            output.push_str(&Self::section_header("Failures"));
            for failure in &report.failures {
                output.push_str(&format!(
                    "  {} answer {}: {}\n",
                    "x".red(),
                    failure.answer,
                    failure.error
                ));
            }
        }

        output
    }

    /// Format the payments of an experiment; `full` lists every job
    pub fn format_payment(report: &PaymentReport, full: bool) -> String {
        let mut output = String::new();

        output.push_str(&Self::section_header(&format!(
            "Experiment {} Payments",
            report.experiment
        )));

        output.push_str(&format!(
            "{} {} {} to {} worker(s)",
            "Paid:".cyan().bold(),
            report.total_paid(),
            report.currency,
            report.outcomes.len() - report.failed_count()
        ));
        if report.failed_count() > 0 {
            output.push_str(&format!(
                ", {}",
                format!("{} failed", report.failed_count()).red()
            ));
        }
        output.push('\n');

        for outcome in &report.outcomes {
            if !full && outcome.succeeded() {
                continue;
            }
            let platform = outcome.platform.as_deref().unwrap_or("-");
            match &outcome.error {
                None => output.push_str(&format!(
                    "  {} worker {:>4}: {:>6} via {}\n",
                    "v".green(),
                    outcome.worker,
                    outcome.amount,
                    platform
                )),
                Some(error) => output.push_str(&format!(
                    "  {} worker {:>4}: {:>6} via {}: {}\n",
                    "x".red(),
                    outcome.worker,
                    outcome.amount,
                    platform,
                    error
                )),
            }
        }

        output
    }

    /// Format worker balances after payment
    pub fn format_balances(workers: &[Worker]) -> String {
        let mut output = Self::section_header("Worker Balances");
        for worker in workers {
            output.push_str(&format!(
                "  worker {:>4} ({}): {}\n",
                worker.id, worker.platform, worker.balance
            ));
        }
        output
    }

    /// Format configuration issues of one experiment
    pub fn format_issues(experiment: ExperimentId, issues: &[ConfigIssue]) -> String {
        if issues.is_empty() {
            return format!("{} experiment {} is valid\n", "v".green(), experiment);
        }

        let mut output = format!(
            "{} experiment {}: {} issue(s)\n",
            "!".yellow().bold(),
            experiment,
            issues.len()
        );
        for issue in issues {
            let label = match issue.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
            };
            output.push_str(&format!(
                "  {} [{}] {}\n",
                label, issue.section, issue.message
            ));
        }
        output
    }

    /// Format the algorithm catalog
    pub fn format_catalog(catalog: &[AlgorithmInfo]) -> String {
        let mut output = Self::header("Quality Algorithms");
        output.push('\n');

        for info in catalog {
            output.push_str(&format!(
                "\n{} {}\n  {}\n",
                info.name.yellow().bold(),
                format!("({})", info.family.as_str()).dimmed(),
                info.description
            ));
            for param in &info.parameters {
                output.push_str(&format!(
                    "    {:<26} {} (default {}, {})\n",
                    param.key.cyan(),
                    param.description,
                    param.default,
                    param.pattern
                ));
            }
        }
        output
    }

    /// Format any report as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdcontrol_application::JobOutcome;
    use crowdcontrol_domain::{QualityStrategies, WorkerId};

    fn payment_report() -> PaymentReport {
        PaymentReport {
            experiment: ExperimentId::new(1),
            currency: "EUR".to_string(),
            outcomes: vec![
                JobOutcome {
                    worker: WorkerId::new(1),
                    amount: 15,
                    platform: Some("ledger".to_string()),
                    error: None,
                },
                JobOutcome {
                    worker: WorkerId::new(2),
                    amount: 5,
                    platform: None,
                    error: Some("No payment platform available for 'mturk'".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_payment_summary_lists_only_failures() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_payment(&payment_report(), false);
        assert!(text.contains("Paid: 15 EUR to 1 worker(s), 1 failed"));
        assert!(text.contains("mturk"));
        assert!(!text.contains("via ledger"));

        let full = ConsoleFormatter::format_payment(&payment_report(), true);
        assert!(full.contains("via ledger"));
    }

    #[test]
    fn test_issues() {
        colored::control::set_override(false);
        let ok = ConsoleFormatter::format_issues(ExperimentId::new(4), &[]);
        assert!(ok.contains("experiment 4 is valid"));

        let issues = vec![ConfigIssue {
            severity: Severity::Error,
            section: "payment",
            message: "negative".to_string(),
        }];
        let text = ConsoleFormatter::format_issues(ExperimentId::new(4), &issues);
        assert!(text.contains("error [payment] negative"));
    }

    #[test]
    fn test_catalog_lists_parameters() {
        colored::control::set_override(false);
        let catalog = QualityStrategies::with_defaults().catalog();
        let text = ConsoleFormatter::format_catalog(&catalog);
        assert!(text.contains("RatingQualityByDistribution"));
        assert!(text.contains("AnswerQualityByRatings"));
        assert!(text.contains("min_quality"));
        assert!(text.contains("rating_quality_threshold"));
    }

    #[test]
    fn test_json() {
        let json = ConsoleFormatter::format_json(&payment_report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcomes"][0]["amount"], 15);
        assert_eq!(value["experiment"], 1);
    }
}
