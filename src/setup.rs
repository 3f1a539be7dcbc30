use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

pub const HOOK_EVENT: &str = "PreCompact";

fn claude_settings_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".claude").join("settings.json"))
}

/// Shell-quote a string for safe use in a hook command line
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '/' | '.' | '_' | '-'))
    {
        return value.to_string();
    }
    let mut out = String::from("'");
    for ch in value.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

pub fn hook_command(exe: &Path) -> String {
    format!("{} precompact", shell_quote(&exe.to_string_lossy()))
}

fn is_registered(groups: &[Value], command: &str) -> bool {
    groups.iter().any(|group| {
        group
            .get("hooks")
            .and_then(|v| v.as_array())
            .is_some_and(|hooks| {
                hooks
                    .iter()
                    .any(|hook| hook.get("command").and_then(|v| v.as_str()) == Some(command))
            })
    })
}

/// Add `command` as a PreCompact hook. Returns false if it was already there.
pub fn install_hook(settings: &mut Value, command: &str) -> Result<bool> {
    let Some(root) = settings.as_object_mut() else {
        bail!("settings must be a JSON object");
    };
    let Some(hooks) = root
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
    else {
        bail!("\"hooks\" must be a JSON object");
    };
    let Some(groups) = hooks
        .entry(HOOK_EVENT)
        .or_insert_with(|| json!([]))
        .as_array_mut()
    else {
        bail!("\"hooks.{HOOK_EVENT}\" must be a JSON array");
    };
    if is_registered(groups, command) {
        return Ok(false);
    }
    groups.push(json!({
        "matcher": "",
        "hooks": [{"type": "command", "command": command}]
    }));
    Ok(true)
}

fn load_settings(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn run(skip_confirm: bool) -> Result<()> {
    let path = claude_settings_path()?;
    let exe = std::env::current_exe().context("failed to locate current executable")?;
    let command = hook_command(&exe);

    let mut settings = load_settings(&path)?;
    if !install_hook(&mut settings, &command)? {
        println!(
            "Skipping {HOOK_EVENT} hook (already installed in {}).",
            path.display()
        );
        return Ok(());
    }

    println!("This will add a {HOOK_EVENT} hook to {}:", path.display());
    println!("  {command}");
    println!();

    if !skip_confirm {
        let confirm = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Install hook?")
            .default(true)
            .interact()?;
        if !confirm {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = serde_json::to_string_pretty(&settings)?;
    content.push('\n');
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Installed {HOOK_EVENT} hook in {}.", path.display());
    println!("Restart Claude Code to pick up changes.");
    Ok(())
}
