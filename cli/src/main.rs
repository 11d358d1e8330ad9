use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use url::Url;

#[derive(Parser)]
#[command(
    name = "maturis",
    version,
    about = "Maturis CLI — operator interface for the diagnostic API and admin CRM"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "MATURIS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Admin password (falls back to ~/.config/maturis/credentials)
    #[arg(long, env = "MATURIS_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Show the question catalog for a sector
    Questions {
        /// Sector key (falls back to the generic catalog when unknown)
        #[arg(long)]
        sector: Option<String>,
        /// Restrict to one wizard step
        #[arg(long)]
        step: Option<u8>,
    },
    /// Admin CRM operations (require the admin password)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List diagnostics
    List {
        /// Filter by sector
        #[arg(long)]
        sector: Option<String>,
        /// Filter by maturity level (debutant, intermediaire, avance, expert)
        #[arg(long)]
        maturity_level: Option<String>,
        /// Row status (default "completed"; "deleted" lists soft-deleted rows)
        #[arg(long)]
        status: Option<String>,
        /// Free-text search over organization, respondent, email
        #[arg(long)]
        q: Option<String>,
        /// Maximum rows
        #[arg(long)]
        limit: Option<u32>,
        /// Pagination cursor from previous response
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Aggregate stats over completed diagnostics
    Stats,
    /// Show one diagnostic with its answers
    Show {
        /// Diagnostic id
        id: String,
    },
    /// Export diagnostics as CSV
    Export {
        /// Filter by sector
        #[arg(long)]
        sector: Option<String>,
        /// Filter by maturity level
        #[arg(long)]
        maturity_level: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Update CRM follow-up fields on a diagnostic
    Crm {
        /// Diagnostic id
        id: String,
        /// New CRM status (new, contacted, qualified, converted, closed)
        #[arg(long)]
        status: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Soft-delete a diagnostic
    Delete {
        /// Diagnostic id
        id: String,
    },
    /// Restore a soft-deleted diagnostic
    Restore {
        /// Diagnostic id
        id: String,
    },
    /// Print the Argon2id hash for MATURIS_ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash
        password: String,
    },
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
    std::process::exit(1);
}

/// Password resolution order: flag/env, then the first non-empty line of
/// ~/.config/maturis/credentials.
fn resolve_admin_password(flag: Option<String>) -> Option<String> {
    if flag.is_some() {
        return flag;
    }
    let path = dirs::config_dir()?.join("maturis").join("credentials");
    let contents = std::fs::read_to_string(path).ok()?;
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

fn query_string(params: &[(&str, Option<String>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value.as_deref().map(|v| {
                format!(
                    "{key}={}",
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                )
            })
        })
        .collect();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if Url::parse(&cli.api_url).is_err() {
        exit_error(
            &format!("'{}' is not a valid API base URL", cli.api_url),
            Some("Set --api-url or MATURIS_API_URL, e.g. https://api.maturis.app"),
        );
    }
    let api_url = cli.api_url.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Health => health(&api_url).await,
        Commands::Questions { sector, step } => questions(&api_url, sector, step).await,
        Commands::Admin { command } => {
            // hash-password is local; everything else talks to the API.
            if let AdminCommands::HashPassword { password } = &command {
                match maturis_core::auth::hash_password(password) {
                    Ok(hash) => {
                        println!("{hash}");
                        return;
                    }
                    Err(e) => exit_error(&e, None),
                }
            }

            let password = resolve_admin_password(cli.admin_password).unwrap_or_else(|| {
                exit_error(
                    "admin password is required for admin operations",
                    Some(
                        "Set --admin-password, MATURIS_ADMIN_PASSWORD, or \
                         ~/.config/maturis/credentials",
                    ),
                );
            });

            match command {
                AdminCommands::List {
                    sector,
                    maturity_level,
                    status,
                    q,
                    limit,
                    cursor,
                } => {
                    let query = query_string(&[
                        ("sector", sector),
                        ("maturity_level", maturity_level),
                        ("status", status),
                        ("q", q),
                        ("limit", limit.map(|l| l.to_string())),
                        ("cursor", cursor),
                    ]);
                    admin_get_json(&api_url, &password, &format!("/v1/admin/diagnostics{query}"))
                        .await
                }
                AdminCommands::Stats => {
                    admin_get_json(&api_url, &password, "/v1/admin/stats").await
                }
                AdminCommands::Show { id } => {
                    admin_get_json(&api_url, &password, &format!("/v1/admin/diagnostics/{id}"))
                        .await
                }
                AdminCommands::Export {
                    sector,
                    maturity_level,
                    output,
                } => {
                    let query = query_string(&[
                        ("sector", sector),
                        ("maturity_level", maturity_level),
                    ]);
                    admin_export(&api_url, &password, &query, output).await
                }
                AdminCommands::Crm { id, status, notes } => {
                    if status.is_none() && notes.is_none() {
                        exit_error(
                            "nothing to update: pass --status and/or --notes",
                            None,
                        );
                    }
                    let mut body = serde_json::Map::new();
                    if let Some(status) = status {
                        body.insert("crm_status".to_string(), json!(status));
                    }
                    if let Some(notes) = notes {
                        body.insert("crm_notes".to_string(), json!(notes));
                    }
                    admin_send_json(
                        &api_url,
                        &password,
                        reqwest::Method::PATCH,
                        &format!("/v1/admin/diagnostics/{id}/crm"),
                        Some(serde_json::Value::Object(body)),
                    )
                    .await
                }
                AdminCommands::Delete { id } => {
                    admin_send_json(
                        &api_url,
                        &password,
                        reqwest::Method::DELETE,
                        &format!("/v1/admin/diagnostics/{id}"),
                        None,
                    )
                    .await
                }
                AdminCommands::Restore { id } => {
                    admin_send_json(
                        &api_url,
                        &password,
                        reqwest::Method::POST,
                        &format!("/v1/admin/diagnostics/{id}/restore"),
                        None,
                    )
                    .await
                }
                AdminCommands::HashPassword { .. } => unreachable!("handled above"),
            }
        }
    };

    if let Err(e) = result {
        exit_error(&e.to_string(), None);
    }
}

async fn health(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let resp = client().get(format!("{api_url}/health")).send().await?;
    let body: serde_json::Value = resp.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn questions(
    api_url: &str,
    sector: Option<String>,
    step: Option<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = query_string(&[("sector", sector), ("step", step.map(|s| s.to_string()))]);
    let resp = client()
        .get(format!("{api_url}/v1/questions{query}"))
        .send()
        .await?;
    print_response(resp).await
}

async fn admin_get_json(
    api_url: &str,
    password: &str,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let resp = client()
        .get(format!("{api_url}{path}"))
        .header("x-admin-password", password)
        .send()
        .await?;
    print_response(resp).await
}

async fn admin_send_json(
    api_url: &str,
    password: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = client()
        .request(method, format!("{api_url}{path}"))
        .header("x-admin-password", password);
    if let Some(body) = body {
        request = request.json(&body);
    }
    print_response(request.send().await?).await
}

async fn admin_export(
    api_url: &str,
    password: &str,
    query: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let resp = client()
        .get(format!("{api_url}/v1/admin/export{query}"))
        .header("x-admin-password", password)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body: serde_json::Value = resp.json().await?;
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(1);
    }

    let csv = resp.text().await?;
    match output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            eprintln!("wrote {} bytes to {}", csv.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

async fn print_response(resp: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;

    if !status.is_success() {
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(1);
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::query_string;

    #[test]
    fn query_string_skips_absent_params() {
        assert_eq!(query_string(&[("sector", None), ("limit", None)]), "");
        assert_eq!(
            query_string(&[
                ("sector", Some("transport".to_string())),
                ("limit", None),
                ("q", Some("keita".to_string())),
            ]),
            "?sector=transport&q=keita"
        );
    }

    #[test]
    fn query_string_escapes_values() {
        assert_eq!(
            query_string(&[("q", Some("Keita & Fils".to_string()))]),
            "?q=Keita+%26+Fils"
        );
    }
}
