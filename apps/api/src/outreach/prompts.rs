// LLM prompt constants for the outreach pipeline.
// Reuses the system prompts from llm_client::prompts.

/// Job extraction prompt. Replace `{page_data}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"### SCRAPED TEXT FROM WEBSITE:
{page_data}

### INSTRUCTION:
The scraped text is from the careers page of a website.
Your job is to extract the job postings and return them in JSON format containing
the following keys: `role`, `experience`, `skills` and `description`.
`skills` must be an array of strings.
Return a single object for one posting, or an array of objects for several.
Strictly output ONLY valid JSON without any preamble, explanations,
formatting characters like triple backticks (```), or any additional text.

### OUTPUT (STRICTLY VALID JSON WITHOUT TRIPLE BACKTICKS):"#;

/// Cold email prompt.
/// Replace: {job_description}, {link_list}, {sender_name}, {sender_title},
///          {company_name}, {company_pitch}
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"### JOB DESCRIPTION:
{job_description}

### INSTRUCTION:
You are {sender_name}, a {sender_title} at {company_name}. {company_name} is {company_pitch}
Your job is to write a cold email to the client regarding the job mentioned above describing the capability of {company_name}
in fulfilling their needs.
Also add the most relevant ones from the following links to showcase {company_name}'s portfolio:
{link_list}
Remember you are {sender_name}, {sender_title} at {company_name}.
Do not provide a preamble.

### EMAIL (NO PREAMBLE):"#;
