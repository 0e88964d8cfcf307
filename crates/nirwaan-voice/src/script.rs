//! What the guide says at each navigation location.

use nirwaan_types::NavigationContext;
use std::collections::HashMap;

/// Sign-in and sign-up location.
pub const AUTH_LOCATION: &str = "/auth";

/// Main dashboard location.
pub const DASHBOARD_LOCATION: &str = "/app";

/// Messages for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideEntry {
    pub greeting: String,
    /// Spoken instead of `greeting` when the context marks a first visit.
    pub first_visit_greeting: Option<String>,
    /// Answer to "how do I use this?".
    pub help: String,
}

impl GuideEntry {
    pub fn new(greeting: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            first_visit_greeting: None,
            help: help.into(),
        }
    }

    pub fn with_first_visit(mut self, greeting: impl Into<String>) -> Self {
        self.first_visit_greeting = Some(greeting.into());
        self
    }

    pub fn greeting_for(&self, context: NavigationContext) -> &str {
        match (&self.first_visit_greeting, context.is_first_time) {
            (Some(first_visit), true) => first_visit.as_str(),
            _ => self.greeting.as_str(),
        }
    }
}

/// Deterministic location-to-message lookup with a catch-all entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideScript {
    entries: HashMap<String, GuideEntry>,
    fallback: GuideEntry,
}

impl GuideScript {
    /// A script that says `fallback` everywhere until entries are added.
    pub fn new(fallback: GuideEntry) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn with_entry(mut self, location: impl Into<String>, entry: GuideEntry) -> Self {
        self.entries.insert(location.into(), entry);
        self
    }

    pub fn entry(&self, location: &str) -> &GuideEntry {
        self.entries.get(location).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &GuideEntry {
        &self.fallback
    }

    pub fn greeting(&self, location: &str, context: NavigationContext) -> &str {
        self.entry(location).greeting_for(context)
    }

    pub fn help(&self, location: &str) -> &str {
        &self.entry(location).help
    }
}

impl Default for GuideScript {
    fn default() -> Self {
        Self::new(GuideEntry::new(
            "I'm here to help you navigate Nirwaan. Feel free to ask me about any features or if you need guidance on using the platform.",
            "I can help you navigate through Nirwaan. Each section has specific tools for your mental wellness journey.",
        ))
        .with_entry(
            AUTH_LOCATION,
            GuideEntry::new(
                "Welcome to Nirwaan, your mental wellness companion! I'm here to guide you through the platform. To get started, please sign in with your existing account or create a new one by clicking the Sign Up tab. If you're new here, I recommend choosing 'User' to access wellness resources and support.",
                "To sign in, enter your email and password, then click the Sign In button. If you don't have an account, click the Sign Up tab, fill in your details, choose your role as either User or Counselor, and provide emergency contact information if you're a user.",
            ),
        )
        .with_entry(
            DASHBOARD_LOCATION,
            GuideEntry::new(
                "Welcome back to your Nirwaan dashboard! From here you can access your wellness tools, take assessments, view your progress, or chat with counselors. Let me know if you need help navigating any features.",
                "You're now in your main dashboard. Here you can take mental health assessments, track your mood, access wellness resources, book counselor sessions, and view your progress over time. Use the navigation menu to explore different sections.",
            )
            .with_first_visit(
                "Great! You've successfully signed in. I'll now guide you through setting up your profile and permissions. This helps us provide personalized mental health support tailored to your needs.",
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_greeting_depends_on_first_visit() {
        let script = GuideScript::default();
        let returning = script.greeting(DASHBOARD_LOCATION, NavigationContext::default());
        let first = script.greeting(DASHBOARD_LOCATION, NavigationContext::first_visit());
        assert!(returning.starts_with("Welcome back"));
        assert!(first.starts_with("Great! You've successfully signed in."));
    }

    #[test]
    fn first_visit_flag_is_ignored_without_variant() {
        let script = GuideScript::default();
        assert_eq!(
            script.greeting(AUTH_LOCATION, NavigationContext::first_visit()),
            script.greeting(AUTH_LOCATION, NavigationContext::default())
        );
    }

    #[test]
    fn unknown_locations_use_fallback() {
        let script = GuideScript::default();
        assert_eq!(script.entry("/journal"), script.fallback());
        assert!(script.help("/journal").starts_with("I can help you navigate"));
        assert_ne!(
            script.help(AUTH_LOCATION),
            script.greeting(AUTH_LOCATION, NavigationContext::default())
        );
    }
}
