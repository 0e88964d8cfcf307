//! Keyword rules that turn what the user said into a supportive reply.
//!
//! Matching is plain substring search over the lower-cased input. Rules are
//! tried in table order and the first rule with any trigger present wins, so
//! "I'm stressed and need help" resolves to the stress rule even though the
//! help rule also matches.

use crate::error::VoiceError;
use serde::{Deserialize, Serialize};

/// Reply used when no rule matches.
pub const DEFAULT_FALLBACK: &str = "I hear you, and I want you to know that your feelings matter. Sometimes just talking about what's on your mind can be helpful. Can you tell me more about what you're experiencing? Remember, you don't have to go through this alone.";

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Keywords checked in order; any one present fires the rule.
    pub triggers: Vec<String>,
    pub response: String,
}

impl RuleEntry {
    /// Creates a rule answering with `response` when any trigger appears.
    pub fn new<I, S>(triggers: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            triggers: triggers.into_iter().map(Into::into).collect(),
            response: response.into(),
        }
    }
}

/// Ordered, immutable rule table with a fallback reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRuleTable {
    rules: Vec<RuleEntry>,
    fallback: String,
}

impl ResponseRuleTable {
    /// Builds a table, normalizing triggers to lower case.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] if the fallback or any response is
    /// blank, a rule has no triggers, or a trigger is blank (a blank trigger
    /// would match every input and shadow all later rules).
    pub fn new(rules: Vec<RuleEntry>, fallback: impl Into<String>) -> Result<Self, VoiceError> {
        let fallback = fallback.into();
        if fallback.trim().is_empty() {
            return Err(VoiceError::Config("fallback response must not be empty".to_string()));
        }

        let mut normalized = Vec::with_capacity(rules.len());
        for (index, rule) in rules.into_iter().enumerate() {
            if rule.response.trim().is_empty() {
                return Err(VoiceError::Config(format!("rule {index} has an empty response")));
            }
            if rule.triggers.is_empty() {
                return Err(VoiceError::Config(format!("rule {index} has no triggers")));
            }
            if rule.triggers.iter().any(|t| t.trim().is_empty()) {
                return Err(VoiceError::Config(format!("rule {index} has an empty trigger")));
            }
            normalized.push(RuleEntry {
                triggers: rule.triggers.iter().map(|t| t.to_lowercase()).collect(),
                response: rule.response,
            });
        }

        Ok(Self {
            rules: normalized,
            fallback,
        })
    }

    /// Index of the rule that fires for `input`, if any.
    pub fn matching_rule(&self, input: &str) -> Option<usize> {
        let input = input.to_lowercase();
        self.rules.iter().position(|rule| {
            rule.triggers
                .iter()
                .any(|trigger| input.contains(trigger.as_str()))
        })
    }

    /// Reply for `input`. Never fails and never returns an empty string.
    pub fn respond(&self, input: &str) -> &str {
        match self.matching_rule(input) {
            Some(index) => &self.rules[index].response,
            None => &self.fallback,
        }
    }

    /// The rules in precedence order.
    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    /// The reply used when no rule matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for ResponseRuleTable {
    fn default() -> Self {
        Self {
            rules: builtin_rules(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// The companion's stock replies, in precedence order.
pub fn builtin_rules() -> Vec<RuleEntry> {
    vec![
        RuleEntry::new(
            ["anxious", "anxiety", "worried"],
            "I understand you're feeling anxious. Try taking slow, deep breaths. Breathe in for 4 counts, hold for 4, and exhale for 6. Remember, anxiety is temporary and you have the strength to get through this. Would you like to try a breathing exercise together?",
        ),
        RuleEntry::new(
            ["sad", "depressed", "down"],
            "I'm sorry you're feeling this way. Your feelings are valid, and it's okay to have difficult days. Sometimes talking about what's bothering you can help. Have you been able to do any activities that usually bring you joy recently?",
        ),
        RuleEntry::new(
            ["stress", "overwhelmed"],
            "Feeling stressed can be really challenging. Let's break things down into smaller, manageable pieces. What's the most pressing thing on your mind right now? Sometimes focusing on just one thing at a time can make everything feel more manageable.",
        ),
        RuleEntry::new(
            ["sleep", "tired", "insomnia"],
            "Sleep is so important for mental health. Try establishing a bedtime routine: no screens 1 hour before bed, keep your room cool and dark, and try some gentle stretching or meditation. Good sleep hygiene can really improve how you feel during the day.",
        ),
        RuleEntry::new(
            ["anger", "angry", "frustrated"],
            "It's natural to feel angry sometimes. When anger comes up, try the 5-4-3-2-1 grounding technique: name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, and 1 you can taste. This can help bring you back to the present moment.",
        ),
        RuleEntry::new(
            ["help", "support"],
            "I'm here to support you. Remember that seeking help is a sign of strength, not weakness. If you're having thoughts of self-harm, please reach out to a crisis helpline immediately. For ongoing support, consider speaking with a counselor or therapist.",
        ),
        RuleEntry::new(
            ["breathing", "breathe"],
            "Let's do a breathing exercise together. I'll guide you: Breathe in slowly for 4 counts... 1, 2, 3, 4. Hold for 4 counts... 1, 2, 3, 4. Now breathe out slowly for 6 counts... 1, 2, 3, 4, 5, 6. Great job! How do you feel?",
        ),
        RuleEntry::new(
            ["meditation", "mindfulness"],
            "Mindfulness can be very helpful for mental wellness. Try this: Focus on your breath, and when your mind wanders, gently bring your attention back. Even 5 minutes a day can make a difference. There are also great apps like Headspace or Calm that can guide you.",
        ),
        RuleEntry::new(
            ["hello", "hi", "hey"],
            "Hello! I'm your AI mental wellness companion. I'm here to provide support, coping strategies, and a listening ear. How are you feeling today? Remember, this is a safe space to share whatever is on your mind.",
        ),
        RuleEntry::new(
            ["thank"],
            "You're very welcome. I'm glad I could help. Remember, taking care of your mental health is an ongoing journey, and every small step counts. Is there anything else you'd like to talk about?",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_table() -> ResponseRuleTable {
        ResponseRuleTable::new(
            vec![
                RuleEntry::new(["stress"], "stress reply"),
                RuleEntry::new(["overwhelmed", "stress"], "overwhelmed reply"),
                RuleEntry::new(["help"], "help reply"),
            ],
            "fallback reply",
        )
        .unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = overlapping_table();
        assert_eq!(table.respond("so much stress, please help"), "stress reply");
        assert_eq!(table.respond("I'm overwhelmed, help"), "overwhelmed reply");
        assert_eq!(table.respond("help me"), "help reply");
    }

    #[test]
    fn later_rule_fires_when_no_earlier_rule_matches() {
        let table = overlapping_table();
        assert_eq!(table.matching_rule("HELP"), Some(2));
        assert_eq!(table.matching_rule("overwhelmed"), Some(1));
    }

    #[test]
    fn empty_and_unmatched_input_use_fallback() {
        let table = ResponseRuleTable::default();
        assert_eq!(table.respond(""), DEFAULT_FALLBACK);
        assert_eq!(table.respond("pizza for lunch"), DEFAULT_FALLBACK);
        assert!(!table.respond("").is_empty());
    }

    #[test]
    fn builtin_table_orders_stress_before_help() {
        let table = ResponseRuleTable::default();
        assert_eq!(table.matching_rule("I'm stressed and need help"), Some(2));
        assert_eq!(table.matching_rule("can you support me"), Some(5));
    }

    #[test]
    fn anxious_input_selects_anxiety_rule() {
        let table = ResponseRuleTable::default();
        let reply = table.respond("I feel anxious about exams");
        assert!(reply.starts_with("I understand you're feeling anxious."));
    }

    #[test]
    fn matching_is_case_insensitive_on_triggers_and_input() {
        let table =
            ResponseRuleTable::new(vec![RuleEntry::new(["Thank"], "welcome")], "fallback").unwrap();
        assert_eq!(table.rules()[0].triggers, vec!["thank".to_string()]);
        assert_eq!(table.respond("THANKS A LOT"), "welcome");
    }

    #[test]
    fn rejects_invalid_tables() {
        let blank_fallback = ResponseRuleTable::new(vec![], "  ");
        assert!(matches!(blank_fallback, Err(VoiceError::Config(_))));

        let blank_trigger = ResponseRuleTable::new(vec![RuleEntry::new([""], "reply")], "fb");
        assert!(
            matches!(blank_trigger, Err(VoiceError::Config(msg)) if msg.contains("empty trigger"))
        );

        let no_triggers = ResponseRuleTable::new(
            vec![RuleEntry::new(Vec::<String>::new(), "reply")],
            "fb",
        );
        assert!(matches!(no_triggers, Err(VoiceError::Config(_))));

        let blank_response = ResponseRuleTable::new(vec![RuleEntry::new(["x"], "")], "fb");
        assert!(matches!(blank_response, Err(VoiceError::Config(_))));
    }
}
