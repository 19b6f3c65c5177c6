//! Email drafting: writes one cold email per job, citing matched portfolio links.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::Persona;
use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::ChatModel;
use crate::models::job::JobRecord;
use crate::models::portfolio::LinkMetadata;
use crate::outreach::prompts::EMAIL_PROMPT_TEMPLATE;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex"));

/// Drafts the email for `job`. The model's text is returned unmodified.
pub async fn write_mail(
    job: &JobRecord,
    links: &[LinkMetadata],
    persona: &Persona,
    llm: &dyn ChatModel,
) -> Result<String, AppError> {
    let prompt = build_email_prompt(job, links, persona)?;
    llm.complete(&prompt, PLAIN_TEXT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Email drafting failed: {e}")))
}

fn build_email_prompt(
    job: &JobRecord,
    links: &[LinkMetadata],
    persona: &Persona,
) -> Result<String, AppError> {
    let job_description = serde_json::to_string_pretty(job)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize job: {e}")))?;

    let link_list = if links.is_empty() {
        "(no matching portfolio links)".to_string()
    } else {
        links
            .iter()
            .map(|m| format!("- {}", m.link))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(fill_template(
        EMAIL_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description.as_str()),
            ("link_list", link_list.as_str()),
            ("sender_name", persona.sender_name.as_str()),
            ("sender_title", persona.sender_title.as_str()),
            ("company_name", persona.company_name.as_str()),
            ("company_pitch", persona.company_pitch.as_str()),
        ],
    ))
}

/// Substitutes `{name}` placeholders in one pass. Inserted values are not
/// rescanned, and unknown placeholders are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn job() -> JobRecord {
        JobRecord {
            role: "Django Developer".into(),
            experience: "3 years".into(),
            skills: vec!["Python".into(), "Django".into()],
            description: "Maintain the payments API.".into(),
        }
    }

    #[test]
    fn test_prompt_includes_job_links_and_persona() {
        let links = vec![
            LinkMetadata {
                link: "https://example.com/django-portfolio".into(),
            },
            LinkMetadata {
                link: "https://example.com/python-portfolio".into(),
            },
        ];
        let prompt = build_email_prompt(&job(), &links, &Persona::default()).unwrap();

        assert!(prompt.contains("\"role\": \"Django Developer\""));
        assert!(prompt.contains("- https://example.com/django-portfolio"));
        assert!(prompt.contains("- https://example.com/python-portfolio"));
        assert!(prompt.contains("You are Mohan"));
        assert!(!prompt.contains("{company_name}"));
    }

    #[test]
    fn test_prompt_without_links_says_so() {
        let prompt = build_email_prompt(&job(), &[], &Persona::default()).unwrap();
        assert!(prompt.contains("(no matching portfolio links)"));
    }

    #[test]
    fn test_placeholders_inside_job_text_are_not_substituted() {
        let job = JobRecord {
            description: "Write to {company_name} about {link_list}".into(),
            ..job()
        };
        let links = vec![LinkMetadata {
            link: "https://example.com/django-portfolio".into(),
        }];
        let prompt = build_email_prompt(&job, &links, &Persona::default()).unwrap();

        assert!(prompt.contains("Write to {company_name} about {link_list}"));
        assert_eq!(prompt.matches("- https://example.com/django-portfolio").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders() {
        assert_eq!(
            fill_template("{greeting}, {name}! {unknown}", &[("greeting", "Hi"), ("name", "Ada")]),
            "Hi, Ada! {unknown}"
        );
    }

    #[tokio::test]
    async fn test_write_mail_returns_raw_text() {
        let reply = "Subject: Django help\n\nDear Hiring Manager,\n...";
        let llm = ScriptedModel::replies(&[reply]);
        let email = write_mail(&job(), &[], &Persona::default(), &llm)
            .await
            .unwrap();
        assert_eq!(email, reply);
    }
}
