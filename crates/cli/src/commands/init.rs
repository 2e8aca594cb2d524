//! `specify init`: bootstrap a project from the latest template release.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crossterm::style::Color;
use indexmap::IndexMap;
use log::debug;
use specify_core::config::{
    ai_choices, default_script_type, expand_path, language_choices, script_type_choices,
    ReleaseSource, AI_ASSISTANT_KEYS, DEFAULT_AI_ASSISTANT, DEFAULT_LANGUAGE, LANGUAGE_KEYS,
    SCRIPT_TYPE_KEYS,
};
use specify_core::context::StageContext;
use specify_core::error::{Error, Result};
use specify_core::extract::Destination;
use specify_core::http::build_client;
use specify_core::i18n::Translator;
use specify_core::pipeline::{init_project, prepare_tracker, GitStep, InitRequest};
use specify_core::release::TemplateVariant;
use specify_core::tools::SystemGit;

use super::check_tool;
use crate::cli_args::InitArgs;
use crate::live::{write_tree, LiveTree};
use crate::panels::{environment_lines, next_steps, print_colored, print_panel};
use crate::selection::{choose, confirm};

/// Where the project goes and what to call it in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTarget {
    pub destination: Destination,
    pub name: String,
}

impl ProjectTarget {
    pub fn here(&self) -> bool {
        !self.destination.is_fresh()
    }
}

/// Resolves the destination from the project name or `--here`, relative to `cwd`.
///
/// # Errors
///
/// Returns [`Error::ProjectNameConflict`] when both are given,
/// [`Error::ProjectNameRequired`] when neither is, and
/// [`Error::ProjectExists`] when the named directory already exists.
pub fn resolve_target(project_name: Option<&str>, here: bool, cwd: &Path) -> Result<ProjectTarget> {
    match (project_name, here) {
        (Some(_), true) => Err(Error::ProjectNameConflict),
        (None, false) => Err(Error::ProjectNameRequired),
        (None, true) => Ok(ProjectTarget {
            destination: Destination::Merge(cwd.to_path_buf()),
            name: cwd
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        }),
        (Some(name), false) => {
            let path = cwd.join(expand_path(name));
            if path.exists() {
                return Err(Error::ProjectExists(name.to_string()));
            }
            Ok(ProjectTarget {
                destination: Destination::Fresh(path),
                name: name.to_string(),
            })
        }
    }
}

/// Accepts `value` if it is one of `keys`.
///
/// # Errors
///
/// Returns [`Error::InvalidChoice`] listing the valid keys.
pub fn validate_choice(kind: &str, value: &str, keys: &[&str]) -> Result<String> {
    if keys.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::invalid_choice(kind, value, keys))
    }
}

/// Returns the flag value if set, otherwise asks with the selector when
/// `interactive`, otherwise falls back to `default`.
#[allow(clippy::too_many_arguments)]
fn pick(
    translator: &Translator,
    flag: Option<&str>,
    kind: &str,
    keys: &[&str],
    options: impl FnOnce() -> IndexMap<String, String>,
    prompt_key: &str,
    default: &str,
    interactive: bool,
) -> Result<String> {
    match flag {
        Some(value) => validate_choice(kind, value, keys),
        None if interactive => choose(
            &options(),
            &translator.t(prompt_key, &[]),
            default,
            &translator.t("selection.navigation_help", &[]),
        ),
        None => Ok(default.to_string()),
    }
}

/// The CLI an assistant needs on `PATH`, with its install hint.
pub fn required_agent_tool(ai_assistant: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match ai_assistant {
        "claude" => Some((
            "claude",
            "https://docs.anthropic.com/en/docs/claude-code/setup",
            "errors.claude_required",
        )),
        "gemini" => Some((
            "gemini",
            "https://github.com/google-gemini/gemini-cli",
            "errors.gemini_required",
        )),
        _ => None,
    }
}

fn count_entries(path: &Path) -> Result<usize> {
    fs::read_dir(path)
        .map(Iterator::count)
        .map_err(|e| Error::io_error("reading".to_string(), path.display().to_string(), e))
}

pub fn run_init(args: &InitArgs, translator: &mut Translator) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let target = resolve_target(args.project_name.as_deref(), args.here, &cwd)?;
    debug!("Project target: {target:?}");

    if target.here() {
        let existing = count_entries(&cwd)?;
        if existing > 0 {
            print_colored(
                &translator.t(
                    "project.not_empty_warning",
                    &[("count", &existing.to_string())],
                ),
                Color::Yellow,
                false,
            )?;
            print_colored(&translator.t("project.merge_warning", &[]), Color::Yellow, false)?;
            if !confirm(&translator.t("project.continue_prompt", &[]))? {
                return Err(Error::OperationCancelled);
            }
        }
    }

    let git = if args.no_git {
        GitStep::Disabled
    } else if check_tool(translator, "git", "https://git-scm.com/downloads")? {
        GitStep::Enabled
    } else {
        print_colored(&translator.t("git.not_found_skip", &[]), Color::Yellow, false)?;
        GitStep::Unavailable
    };

    let interactive = std::io::stdin().is_terminal();

    let ai_assistant = pick(
        translator,
        args.ai_assistant.as_deref(),
        "AI assistant",
        &AI_ASSISTANT_KEYS,
        || ai_choices(translator),
        "selection.choose_ai",
        DEFAULT_AI_ASSISTANT,
        true,
    )?;

    if !args.ignore_agent_tools {
        if let Some((tool, hint, message_key)) = required_agent_tool(&ai_assistant) {
            if !check_tool(translator, tool, hint)? {
                print_colored(&translator.t(message_key, &[]), Color::Red, false)?;
                println!();
                print_colored(&translator.t("errors.missing_ai_tool", &[]), Color::Red, false)?;
                print_colored(&translator.t("errors.ignore_tools_tip", &[]), Color::Yellow, false)?;
                return Err(Error::MissingAgentTool(tool.to_string()));
            }
        }
    }

    let script_type = pick(
        translator,
        args.script_type.as_deref(),
        "script type",
        &SCRIPT_TYPE_KEYS,
        || script_type_choices(translator),
        "selection.choose_script",
        default_script_type(),
        interactive,
    )?;

    let language = pick(
        translator,
        args.language.as_deref(),
        "language",
        &LANGUAGE_KEYS,
        || language_choices(translator),
        "selection.choose_language",
        DEFAULT_LANGUAGE,
        interactive,
    )?;

    translator.set_language(&language);

    for line in [
        translator.t("summary.selected_ai", &[("ai", &ai_assistant)]),
        translator.t("summary.selected_script", &[("script", &script_type)]),
        translator.t("summary.selected_language", &[("language", &language)]),
    ] {
        print_colored(&line, Color::Cyan, false)?;
    }

    let request = InitRequest {
        destination: target.destination.clone(),
        variant: TemplateVariant::new(&ai_assistant, &script_type, &language),
        download_dir: download_dir(),
        git,
    };

    let translator: &Translator = translator;
    let mut tracker = prepare_tracker(translator, &request.variant);
    let live = std::io::stdout().is_terminal();
    if live {
        tracker.attach(Box::new(LiveTree::stdout()));
    }

    let client = build_client(args.skip_tls)?;
    let outcome = {
        let mut ctx = StageContext::new(Some(&mut tracker), translator, args.debug);
        init_project(
            &client,
            &ReleaseSource::from_env(),
            &SystemGit,
            &request,
            &mut ctx,
        )
    };

    // The live view already shows the last state; a plain copy is only needed
    // when it never ran.
    if tracker.detach().is_none() {
        write_tree(&mut std::io::stdout(), &tracker.render())?;
    }

    match outcome {
        Ok(outcome) => {
            debug!("Initialized project: {outcome:?}");
            println!();
            print_colored(&translator.t("summary.project_ready", &[]), Color::Green, true)?;
            println!();
            print_panel(
                &translator.t("next_steps.title", &[]),
                &next_steps(translator, &ai_assistant, &target.name, target.here()),
                Color::Cyan,
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            print_panel(
                "Failure",
                &[translator.t("errors.initialization_failed", &[("error", &e.to_string())])],
                Color::Red,
            )?;
            if args.debug {
                print_panel("Debug Environment", &environment_lines(), Color::Magenta)?;
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn download_dir() -> PathBuf {
    std::env::temp_dir()
}
