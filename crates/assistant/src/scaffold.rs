//! Project scaffold generators. Four of these are prompt templates sent to
//! the code model; `buildservices` is a static directory and never touches
//! the provider.

use crate::persona::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldKind {
    Apk,
    Web,
    Project,
    Github,
    Services,
}

impl ScaffoldKind {
    /// The command name this scaffold is registered under.
    pub fn command_name(&self) -> &'static str {
        match self {
            ScaffoldKind::Apk => "buildapk",
            ScaffoldKind::Web => "buildweb",
            ScaffoldKind::Project => "buildproject",
            ScaffoldKind::Github => "github",
            ScaffoldKind::Services => "buildservices",
        }
    }

    /// Heading used in the reply.
    pub fn title(&self) -> &'static str {
        match self {
            ScaffoldKind::Apk => "Android build plan",
            ScaffoldKind::Web => "Web app scaffold",
            ScaffoldKind::Project => "Project scaffold",
            ScaffoldKind::Github => "Repository plan",
            ScaffoldKind::Services => "Build & deploy services",
        }
    }

    /// The task and prompt for this scaffold, or `None` for the static
    /// services listing.
    pub fn prompt(&self, brief: &str) -> Option<(Task, String)> {
        let prompt = match self {
            ScaffoldKind::Apk => (
                Task::BuildApk,
                format!(
                    "Walk through building an Android app for this idea: {brief}. \
                     Cover project setup, the key screens with their code, and the \
                     exact steps to produce a signed APK."
                ),
            ),
            ScaffoldKind::Web => (
                Task::BuildWeb,
                format!(
                    "Scaffold a static web app for this idea: {brief}. Provide \
                     index.html, a stylesheet, and a script file, complete enough \
                     to open in a browser, then note how to deploy it."
                ),
            ),
            ScaffoldKind::Project => (
                Task::BuildProject,
                format!(
                    "Scaffold a complete starter project for this idea: {brief}. \
                     Pick a sensible stack, lay out the directory tree, and write \
                     the core files."
                ),
            ),
            ScaffoldKind::Github => (
                Task::GithubSetup,
                format!(
                    "Plan a GitHub repository for this idea: {brief}. Give the \
                     directory layout, a README outline, a .gitignore, and a \
                     starter GitHub Actions workflow."
                ),
            ),
            ScaffoldKind::Services => return None,
        };
        Some(prompt)
    }
}

/// Services shown by `buildservices`.
pub const BUILD_SERVICES: &[(&str, &str)] = &[
    ("GitHub Actions", "automated builds and releases straight from your repo"),
    ("Codemagic", "CI/CD pipelines for Flutter and Android"),
    ("Netlify", "static site hosting with instant deploys"),
    ("Vercel", "frontend hosting with preview builds per branch"),
    ("Railway", "backends, databases, and cron jobs"),
    ("Fly.io", "containers running close to your users"),
];

/// The static reply for `buildservices`.
pub fn services_reply() -> String {
    let mut out = String::from("\u{1f6e0}\u{fe0f} **Build & deploy services**\n");
    for (name, blurb) in BUILD_SERVICES {
        out.push_str(&format!("\u{2022} **{name}**: {blurb}\n"));
    }
    out.push_str("\nTell me about your project and I can suggest which one fits.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_scaffolds_embed_the_brief() {
        for kind in [
            ScaffoldKind::Apk,
            ScaffoldKind::Web,
            ScaffoldKind::Project,
            ScaffoldKind::Github,
        ] {
            let (_, prompt) = kind.prompt("a recipe tracker").unwrap();
            assert!(prompt.contains("a recipe tracker"), "{kind:?}");
        }
    }

    #[test]
    fn services_is_static() {
        assert!(ScaffoldKind::Services.prompt("anything").is_none());
        let reply = services_reply();
        for (name, _) in BUILD_SERVICES {
            assert!(reply.contains(name));
        }
    }

    #[test]
    fn scaffold_tasks_use_the_code_model() {
        let (task, _) = ScaffoldKind::Apk.prompt("x").unwrap();
        assert!(!task.uses_chat_model());
    }
}
