use chrono::Utc;
use maturis_core::diagnostic::{DiagnosticResult, Organization, Respondent};
use sqlx::PgPool;
use uuid::Uuid;

const EMAIL_TYPE_SUBMISSION: &str = "submission_notification";

/// Best-effort webhook notification fired after a successful submission.
///
/// Everything in here is fire-and-forget: failures are logged to tracing and
/// to `emails_log`, never retried synchronously, and never surfaced to the
/// respondent. The submission outcome is already decided before this runs.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    /// Reads `MATURIS_NOTIFY_WEBHOOK_URL`. Absent or empty means notification
    /// is disabled entirely.
    pub fn from_env() -> Option<Self> {
        let webhook_url = std::env::var("MATURIS_NOTIFY_WEBHOOK_URL").ok()?;
        if webhook_url.is_empty() {
            return None;
        }
        Some(Self {
            client: reqwest::Client::new(),
            webhook_url,
        })
    }

    /// Deliver the webhook and log the attempt. Swallows every failure.
    pub async fn notify_submission(
        self,
        pool: PgPool,
        diagnostic_id: Uuid,
        organization: Organization,
        respondent: Respondent,
        result: DiagnosticResult,
    ) {
        let payload = serde_json::json!({
            "diagnostic_id": diagnostic_id,
            "organization": organization,
            "respondent": respondent,
            "result": result,
        });

        let delivery = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        let (status, error_message) = match delivery {
            Ok(_) => ("sent", None),
            Err(err) => {
                tracing::warn!(
                    diagnostic_id = %diagnostic_id,
                    error = %err,
                    "submission notification failed"
                );
                ("failed", Some(err.to_string()))
            }
        };

        let logged = sqlx::query(
            r#"
            INSERT INTO emails_log
                (id, diagnostic_id, email_type, recipient_email, status, error_message, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(diagnostic_id)
        .bind(EMAIL_TYPE_SUBMISSION)
        .bind(&respondent.email)
        .bind(status)
        .bind(&error_message)
        .bind((status == "sent").then(Utc::now))
        .execute(&pool)
        .await;

        if let Err(err) = logged {
            tracing::warn!(
                diagnostic_id = %diagnostic_id,
                error = %err,
                "failed to record notification in emails_log"
            );
        }
    }
}
