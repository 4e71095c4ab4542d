//! Prompt templates for the trend report

use crate::error::{Result, StockError};
use minijinja::{Environment, context};

/// System role for the report request
pub const SYSTEM_PROMPT: &str = "Assume the role of an expert financial analyst and advisor.";

/// Section headings the report is asked to contain, in order
pub const REPORT_SECTIONS: [&str; 11] = [
    "Stock Performance Analysis",
    "News and Events",
    "Volatility Analysis",
    "Volume Trends",
    "Support and Resistance Levels",
    "Technical Indicators",
    "Comparative Performance",
    "Dividend History",
    "Risk Factors",
    "Recommendations",
    "Summary",
];

const ANALYSIS_TEMPLATE: &str = r"Please analyze the data of the company {{ company }}, find out stock trends when it was higher when it was lower:
{{ digest }}.
Provide a detailed analysis of how the stock's price has changed over the time period, and identify any relevant news or events that may have influenced these trends.
At the end, write a short summary of the overall stock performance.

Then, for each week (for traders, first 4 weeks) and each month (for investors, next 10 months), recommend whether an investor should Buy, Sell, or Hold the stock.
List each recommendation with a brief reasoning.

Format your response in clear plain text. Use simple section headings written as plain text (for example: Stock Performance Analysis, News and Events, Recommendations), but do not use any markdown, bold, italics, bullet points, or special characters. Do not add extra spacing or decorations. The output should be directly suitable for a terminal (CLI) display.

Example structure:
{% for section in sections %}
{{ section }}
{% if section == 'Recommendations' %}
For Traders (Weekly):
{% for week in weeks %}{{ week }} Week: [Buy/Sell/Hold] - [Reason]
{% endfor %}
For Investors (Monthly):
{% for month in months %}{{ month }} Month: [Buy/Sell/Hold] - [Reason]
{% endfor %}{% elif section == 'Summary' %}[Final summary here]
{% else %}[Your analysis here]
{% endif %}{% endfor %}";

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Render the user message asking for a report on `company`
pub fn render_analysis_prompt(company: &str, digest: &str) -> Result<String> {
    let env = Environment::new();
    let weeks: Vec<String> = (1..=4).map(ordinal).collect();
    let months: Vec<String> = (1..=10).map(ordinal).collect();

    env.render_str(
        ANALYSIS_TEMPLATE,
        context! {
            company => company,
            digest => digest,
            sections => REPORT_SECTIONS,
            weeks => weeks,
            months => months,
        },
    )
    .map_err(|e| StockError::Config(format!("Failed to render analysis prompt: {e}")))
}
