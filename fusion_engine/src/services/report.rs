//! Report Generator
//!
//! Renders a completed fusion report into an executive Markdown document.
//! Reads only the `FusionReport` it is given; the fusion engine has no
//! knowledge of this format.

use crate::models::{FusionReport, ProviderKind};

/// Markdown renderer for fusion reports
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the full executive report.
    pub fn render_markdown(report: &FusionReport) -> String {
        let meta = &report.meta;
        let fusion = &report.fusion;

        let mut out = String::new();

        out.push_str(&format!("# Strategic Fusion Report: {}\n\n", meta.client_name));
        out.push_str("Executive Analysis & Strategic Insights\n\n");
        out.push_str(&format!("- Date: {}\n", meta.timestamp.format("%B %d, %Y")));
        out.push_str(&format!("- Scope: {}\n", meta.scope));
        out.push_str(&format!("- Providers: {}\n", Self::provider_list(&meta.providers)));
        out.push_str(&format!("- Run: {}\n", meta.run_id));
        out.push_str("- Confidentiality: Confidential - Internal Use Only\n\n");

        out.push_str("## Consensus\n\n");
        out.push_str(&format!("- Strength: **{}**\n", fusion.consensus.strength));
        out.push_str(&format!(
            "- Providers responding: {}\n",
            fusion.consensus.provider_count
        ));
        out.push_str(&format!(
            "- Agreement score: {:.2}\n\n",
            fusion.consensus.agreement_score
        ));

        out.push_str("## Consensus Insights\n\n");
        if fusion.insights.is_empty() {
            out.push_str("_No insights identified._\n\n");
        } else {
            for insight in &fusion.insights {
                out.push_str(&format!(
                    "- **[{}]** {} _(source: {})_\n",
                    insight.confidence,
                    insight.insight,
                    Self::provider_list(&insight.sources),
                ));
            }
            out.push('\n');
        }

        out.push_str("## Risk Assessment\n\n");
        if fusion.risks.is_empty() {
            out.push_str("_No risks identified._\n\n");
        } else {
            out.push_str("| Type | Severity | Description | Mitigation | Source |\n");
            out.push_str("|------|----------|-------------|------------|--------|\n");
            for risk in &fusion.risks {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    risk.risk_type, risk.severity, risk.description, risk.mitigation, risk.source,
                ));
            }
            out.push('\n');
        }

        out.push_str("## Growth Opportunities\n\n");
        if fusion.growth_ops.is_empty() {
            out.push_str("_No opportunities identified._\n\n");
        } else {
            out.push_str("| Category | Potential | Description | Timeframe | Investment | Source |\n");
            out.push_str("|----------|-----------|-------------|-----------|------------|--------|\n");
            for op in &fusion.growth_ops {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    op.category, op.potential, op.description, op.timeframe, op.investment, op.source,
                ));
            }
            out.push('\n');
        }

        if !fusion.investor_angles.is_empty() {
            out.push_str("## Investor Angles\n\n");
            for angle in &fusion.investor_angles {
                out.push_str(&format!(
                    "- **{}** ({}): {} _(source: {})_\n",
                    angle.aspect, angle.confidence, angle.analysis, angle.source,
                ));
            }
            out.push('\n');
        }

        out
    }

    fn provider_list(providers: &[ProviderKind]) -> String {
        if providers.is_empty() {
            return "none".to_string();
        }

        providers
            .iter()
            .map(ProviderKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
