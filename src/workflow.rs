//! Interactive project and role creation.
//!
//! All terminal I/O goes through the [`Prompt`] capability, so these
//! workflows can be driven by scripted answers in tests. A user typing
//! `quit` is not an error: the workflow returns [`WorkflowOutcome::Cancelled`].

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::INDEX_FILENAME;
use crate::error::Result;
use crate::models::{Project, Role};
use crate::registry::ProjectRegistry;
use crate::storage::{FileVault, ProjectStorage};

/// Message shown when the user abandons a workflow.
pub const CANCELLED_MESSAGE: &str = "...project creation abandoned, goodbye";

pub trait Prompt {
    /// Ask a question and return the answer without its trailing newline.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Show an informational message.
    fn say(&mut self, message: &str);
}

/// Prompt backed by stdin/stdout.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> WorkflowOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Process exit status: a cancelled workflow exits 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed(_) => 0,
            Self::Cancelled => 1,
        }
    }
}

/// Why `name` cannot be used as a project file name, if it cannot.
///
/// Names become `<name>.json` in a vault, which also holds the index, and
/// must come back unchanged when the index is rebuilt from a directory scan.
pub fn invalid_project_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("is empty")
    } else if name.starts_with('.') {
        Some("cannot start with '.'")
    } else if name.contains(['/', '\\']) {
        Some("cannot contain path separators")
    } else if Some(name) == INDEX_FILENAME.strip_suffix(".json") {
        Some("is reserved for the project index")
    } else {
        None
    }
}

/// Ask where new projects should be stored. An empty answer keeps `default_dir`.
pub fn initialize_vault(prompt: &mut dyn Prompt, default_dir: &Path) -> Result<FileVault> {
    let answer = prompt.ask(&format!(
        "Where would you like your project to be stored? Press Enter to use {}: ",
        default_dir.display()
    ))?;
    let answer = answer.trim();

    if answer.is_empty() {
        FileVault::open(default_dir)
    } else {
        FileVault::open(answer)
    }
}

/// Create a project (or extend an existing one) with a new role, save it and
/// register it.
///
/// An existing project is loaded from, and saved back to, the vault the
/// registry already knows for it, so a name never ends up in two vaults.
pub fn initialize_project(
    prompt: &mut dyn Prompt,
    registry: &mut ProjectRegistry,
    default_dir: &Path,
) -> Result<WorkflowOutcome<Project>> {
    let mut vault = initialize_vault(prompt, default_dir)?;

    prompt.say("");
    let mut project_name = prompt.ask("Enter project name: ")?.trim().to_string();
    while let Some(problem) = invalid_project_name(&project_name) {
        prompt.say(&format!("Project name \"{}\" {}.", project_name, problem));
        project_name = prompt
            .ask("Enter a different project name or type 'quit' to exit: ")?
            .trim()
            .to_string();
        if project_name.eq_ignore_ascii_case("quit") {
            return Ok(WorkflowOutcome::Cancelled);
        }
    }

    let mut project = if registry.exists(&project_name) {
        prompt.say(&format!("Project {} already exists.", project_name));
        let action = prompt.ask(
            "Do you want to add a new role/rate or quit? Enter 'role' to add a role or 'quit' to exit: ",
        )?;
        if action.trim().eq_ignore_ascii_case("quit") {
            return Ok(WorkflowOutcome::Cancelled);
        }

        vault = FileVault::open(registry.get_vault_path(&project_name)?)?;
        vault.load(&project_name)?
    } else {
        prompt.say(&format!("\n\tProject \"{}\" initialized.\n", project_name));
        Project::new(project_name)
    };

    if initialize_role(prompt, &mut project)?.is_cancelled() {
        return Ok(WorkflowOutcome::Cancelled);
    }

    vault.save(&project)?;
    registry.update_index(vault.base_path(), &project.name)?;
    prompt.say(&format!("\n\tProject \"{}\" saved.\n", project.name));

    Ok(WorkflowOutcome::Completed(project))
}

/// Ask for a role name and hourly rate and append the role to `project`.
///
/// Taken names are asked again until the user picks a free one or types
/// `quit`. An empty or unreadable rate counts as 0.
pub fn initialize_role(
    prompt: &mut dyn Prompt,
    project: &mut Project,
) -> Result<WorkflowOutcome<Role>> {
    let mut role_name = prompt.ask("Enter a project role: ")?.trim().to_string();
    while project.has_role(&role_name) {
        prompt.say(&format!("Role {} already exists.", role_name));
        role_name = prompt
            .ask("Enter a different name for the role or type 'quit' to exit: ")?
            .trim()
            .to_string();
        if role_name.eq_ignore_ascii_case("quit") {
            return Ok(WorkflowOutcome::Cancelled);
        }
    }

    let rate = prompt.ask("Enter a hourly rate for this role: ")?;
    let hourly_rate = rate.trim().parse::<u32>().unwrap_or(0);

    let role = Role::new(role_name, hourly_rate);
    project.add_role(role.clone())?;
    prompt.say(&format!(
        "\n\tRole \"{}\" added with rate of ${}/hour.\n",
        role.name, role.hourly_rate
    ));

    Ok(WorkflowOutcome::Completed(role))
}

/// Add a role to a registered project and save it in place.
pub fn add_role(
    prompt: &mut dyn Prompt,
    registry: &ProjectRegistry,
    project_name: &str,
) -> Result<WorkflowOutcome<Project>> {
    let vault = FileVault::open(registry.get_vault_path(project_name)?)?;
    let mut project = vault.load(project_name)?;

    if initialize_role(prompt, &mut project)?.is_cancelled() {
        return Ok(WorkflowOutcome::Cancelled);
    }

    vault.save(&project)?;
    Ok(WorkflowOutcome::Completed(project))
}
