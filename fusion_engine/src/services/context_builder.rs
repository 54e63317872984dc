//! Context Builder Service
//!
//! Builds the textual analysis context from the client profile and attached
//! documents, then produces the scope-specific prompt instructing providers
//! to return JSON with scope-dependent keys. Plain string assembly, no
//! templating engine.

use crate::models::{AnalysisScope, ClientProfile, DocumentRef};

/// Context builder for provider prompts
pub struct ContextBuilder;

impl ContextBuilder {
    /// One line per document: `title (tag, tag)`.
    pub fn doc_summary(docs: &[DocumentRef]) -> String {
        docs.iter()
            .map(|doc| format!("{} ({})", doc.title, doc.tags.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Base context shared by every scope prompt.
    fn base_prompt(client: &ClientProfile, docs: &[DocumentRef]) -> String {
        format!(
            "\nClient: {}\nIndustry: {}\nCountry: {}\nStatus: {}\n\nAvailable Documents:\n{}\n\n",
            client.name,
            client.industry,
            client.country,
            client.status,
            Self::doc_summary(docs),
        )
    }

    /// Full prompt for the requested analysis scope.
    pub fn build_prompt(
        client: &ClientProfile,
        docs: &[DocumentRef],
        scope: AnalysisScope,
    ) -> String {
        let base = Self::base_prompt(client, docs);

        match scope {
            AnalysisScope::General => format!(
                "{base}\
Provide a comprehensive strategic analysis covering:\n\
1. Market positioning and competitive landscape\n\
2. Key business opportunities (top 5)\n\
3. Major risks and challenges (top 5)\n\
4. Strategic recommendations\n\n\
Format as JSON with keys: insights[], risks[], opportunities[], recommendations[]"
            ),

            AnalysisScope::Risk => format!(
                "{base}\
Focus on risk analysis:\n\
1. Operational risks specific to {industry}\n\
2. Market risks in {country}\n\
3. Financial and regulatory risks\n\
4. Mitigation strategies\n\n\
Format as JSON with keys: risks[] (each with: type, severity, impact, mitigation)",
                industry = client.industry,
                country = client.country,
            ),

            AnalysisScope::Growth => format!(
                "{base}\
Focus on growth opportunities:\n\
1. Market expansion possibilities\n\
2. Product/service innovation areas\n\
3. Partnership and collaboration opportunities\n\
4. Emerging trends to leverage\n\n\
Format as JSON with keys: growth_ops[] (each with: category, potential, timeframe, investment)"
            ),

            AnalysisScope::Investor => format!(
                "{base}\
Create an investor-ready analysis:\n\
1. Investment thesis and value proposition\n\
2. Market size and growth trajectory\n\
3. Competitive advantages\n\
4. Financial outlook and ROI potential\n\
5. Risk factors\n\n\
Format as JSON with keys: investor_angles[] (each with: aspect, analysis, confidence)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> ClientProfile {
        ClientProfile {
            id: "c1".to_string(),
            name: "Acme".to_string(),
            industry: "logistics".to_string(),
            country: "Egypt".to_string(),
            website: "https://acme.example".to_string(),
            status: "active".to_string(),
        }
    }

    fn make_doc(title: &str, tags: &[&str]) -> DocumentRef {
        DocumentRef {
            title: title.to_string(),
            doc_type: "pdf".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            path: format!("/docs/{title}"),
        }
    }

    #[test]
    fn doc_summary_formats_title_and_tags() {
        let docs = vec![
            make_doc("Market Study", &["mena", "mobility"]),
            make_doc("Financials", &["q4"]),
        ];

        let summary = ContextBuilder::doc_summary(&docs);
        assert_eq!(summary, "Market Study (mena, mobility)\nFinancials (q4)");
    }

    #[test]
    fn each_scope_selects_its_own_prompt() {
        let client = make_client();

        let general = ContextBuilder::build_prompt(&client, &[], AnalysisScope::General);
        assert!(general.contains("comprehensive strategic analysis"));
        assert!(general.contains("insights[], risks[], opportunities[]"));

        let risk = ContextBuilder::build_prompt(&client, &[], AnalysisScope::Risk);
        assert!(risk.contains("Focus on risk analysis"));
        assert!(risk.contains("Operational risks specific to logistics"));
        assert!(risk.contains("Market risks in Egypt"));

        let growth = ContextBuilder::build_prompt(&client, &[], AnalysisScope::Growth);
        assert!(growth.contains("Focus on growth opportunities"));
        assert!(growth.contains("growth_ops[]"));

        let investor = ContextBuilder::build_prompt(&client, &[], AnalysisScope::Investor);
        assert!(investor.contains("investor-ready analysis"));
        assert!(investor.contains("investor_angles[]"));
    }

    #[test]
    fn prompt_carries_client_context() {
        let client = make_client();
        let docs = vec![make_doc("Market Study", &["mena"])];

        let prompt = ContextBuilder::build_prompt(&client, &docs, AnalysisScope::General);
        assert!(prompt.contains("Client: Acme"));
        assert!(prompt.contains("Industry: logistics"));
        assert!(prompt.contains("Market Study (mena)"));
    }
}
