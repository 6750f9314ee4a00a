//! Markdown rendering of a [`ReportDocument`].

use std::fmt::Write;

use super::document::ReportDocument;

fn pass_fail(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

impl ReportDocument {
    /// Render the document as a Markdown report.
    pub fn to_markdown(&self) -> String {
        // Writing to a String cannot fail.
        let mut out = String::new();
        let _ = self.write_markdown(&mut out);
        out
    }

    fn write_markdown(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "# Test Report: {} ({})", self.scenario_name, self.status.as_str())?;
        writeln!(out)?;
        if !self.scenario_description.is_empty() {
            writeln!(out, "{}", self.scenario_description)?;
            writeln!(out)?;
        }

        writeln!(out, "## Narrative")?;
        writeln!(out)?;
        writeln!(out, "{}", self.narrative)?;
        writeln!(out)?;

        writeln!(out, "## Summary")?;
        writeln!(out)?;
        writeln!(out, "- Session: `{}`", self.session_id)?;
        writeln!(out, "- Started: {}", self.started_at.to_rfc3339())?;
        writeln!(out, "- Reported: {}", self.reported_at.to_rfc3339())?;
        writeln!(out, "- Duration: {:.1}s", self.duration_seconds)?;
        writeln!(
            out,
            "- Termination: {}",
            self.done_reason.map_or("running", |r| r.as_str())
        )?;
        writeln!(out, "- Steps: {} / {}", self.steps_taken, self.max_steps)?;
        writeln!(out, "- Objective attempts: {} / {}", self.attempts_used, self.attempts_cap)?;
        writeln!(out)?;

        writeln!(out, "## Objectives")?;
        writeln!(out)?;
        if self.objectives.is_empty() {
            writeln!(out, "No objective attempts were resolved.")?;
        } else {
            writeln!(out, "| # | Objective | Type | Target | Actual | Elapsed | Result |")?;
            writeln!(out, "|---|-----------|------|--------|--------|---------|--------|")?;
            for row in &self.objectives {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {:.1}s | {} |",
                    row.attempt,
                    row.id,
                    row.kind,
                    row.target,
                    row.actual,
                    row.elapsed_seconds,
                    pass_fail(row.passed)
                )?;
            }
        }
        writeln!(out)?;

        writeln!(out, "## Constraints")?;
        writeln!(out)?;
        writeln!(out, "| Constraint | Limit | Actual | Result |")?;
        writeln!(out, "|------------|-------|--------|--------|")?;
        for row in &self.constraints {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                row.name,
                row.limit,
                row.actual,
                pass_fail(row.passed)
            )?;
        }
        writeln!(out)?;

        let p = &self.progress;
        writeln!(out, "## Progress")?;
        writeln!(out)?;
        writeln!(
            out,
            "- Goals found: {} / {} ({:.0}%)",
            p.goal_found, p.goal_total, p.goal_percent
        )?;
        writeln!(out, "- Step budget used: {:.0}%", p.step_budget_percent)?;
        writeln!(out, "- Objective success rate: {:.0}%", p.objective_success_percent)?;
        if let Some(obs) = &self.last_observation {
            writeln!(
                out,
                "- Last position: ({:.2}, {:.2}, {:.2}), yaw {:.1}",
                obs.position.x, obs.position.y, obs.position.z, obs.yaw
            )?;
        }
        writeln!(out)?;

        writeln!(out, "## Commands")?;
        writeln!(out)?;
        if self.command_histogram.is_empty() {
            writeln!(out, "No commands issued.")?;
        } else {
            writeln!(out, "| Verb | Count |")?;
            writeln!(out, "|------|-------|")?;
            for (verb, count) in &self.command_histogram {
                writeln!(out, "| {verb} | {count} |")?;
            }
        }
        writeln!(out)?;

        writeln!(out, "## Findings")?;
        writeln!(out)?;
        writeln!(out, "- Issue: {}", self.issue)?;
        writeln!(out, "- Recommendation: {}", self.recommendation)?;
        Ok(())
    }
}
