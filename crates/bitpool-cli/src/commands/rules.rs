// crates/bitpool-cli/src/commands/rules.rs
//
// `bitpool rules`: show the active group protection rules.

use tabled::Tabled;

use super::Context;
use crate::output::{format_json, format_table, OutputFormat};

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Rule")]
    rule: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Run the rules command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let policy = ctx.engine.config();

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(policy)),
        OutputFormat::Table => {
            let window = policy.voting_window();
            let rows = vec![
                RuleRow {
                    rule: "Max instant withdrawal",
                    value: format!("{} of available", policy.instant_withdrawal_ratio()),
                },
                RuleRow {
                    rule: "Auto-vault",
                    value: format!("{} of each deposit", policy.vault_ratio()),
                },
                RuleRow {
                    rule: "Approval quorum",
                    value: format!("{} of members", policy.quorum_ratio()),
                },
                RuleRow {
                    rule: "Voting window",
                    value: format!("{} hours", window.num_hours()),
                },
            ];
            println!("Group Protection Rules");
            println!("{}", format_table(&rows));
            println!("{}", policy.rules_summary());
        }
    }

    Ok(())
}
