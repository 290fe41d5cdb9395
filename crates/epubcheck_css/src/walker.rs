use crate::handler::ParseEvent;
use itertools::Itertools;
use std::io::Write;

/// The walker prints recorded parse events as an indented tree
pub struct Walker<'a> {
    events: &'a [ParseEvent],
}

impl<'a> Walker<'a> {
    #[must_use]
    pub fn new(events: &'a [ParseEvent]) -> Self {
        Self { events }
    }

    pub fn walk_stdout(&self) {
        let _ = inner_walk(self.events, &mut std::io::stdout());
    }

    #[must_use]
    pub fn walk_to_string(&self) -> String {
        let mut output: Vec<u8> = Vec::new();

        let _ = inner_walk(self.events, &mut output);

        String::from_utf8_lossy(&output).into_owned()
    }
}

fn inner_walk(events: &[ParseEvent], f: &mut dyn Write) -> Result<(), std::io::Error> {
    let mut depth = 0;

    for event in events {
        let prefix = " ".repeat(depth * 2);

        match event {
            ParseEvent::StartDocument => {
                writeln!(f, "{prefix}[Document]")?;
                depth += 1;
            }
            ParseEvent::StartAtRule(at_rule) => {
                writeln!(f, "{prefix}[AtRule] {}", at_rule.to_css_string())?;
                depth += 1;
            }
            ParseEvent::Selectors(selectors) => {
                writeln!(
                    f,
                    "{prefix}[RuleSet ({})] {}",
                    selectors.len(),
                    selectors.iter().map(|s| s.to_css_string()).join(", ")
                )?;
                depth += 1;
            }
            ParseEvent::Declaration(declaration) => {
                writeln!(f, "{prefix}[Declaration] {}", declaration.to_css_string())?;
            }
            ParseEvent::EndAtRule(_) | ParseEvent::EndSelectors(_) | ParseEvent::EndDocument => {
                depth = depth.saturating_sub(1);
            }
        }
    }

    Ok(())
}
