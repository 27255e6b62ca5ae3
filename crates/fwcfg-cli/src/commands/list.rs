//! List command: catalog settings, groups, dependency rules and environment keys

use colored::Colorize;
use fwcfg_core::Project;
use fwcfg_meta::Catalog;

use crate::error::Result;

/// Run the list command
pub fn run_list(project: &Project, groups: bool, json: bool) -> Result<()> {
    let catalog = project.load_catalog()?;

    if groups {
        list_groups(&catalog, json)
    } else {
        list_settings(&catalog, json)
    }
}

fn list_settings(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.settings())?);
        return Ok(());
    }

    println!("{}", "Settings".bold());
    println!();
    for setting in catalog.settings() {
        let mut tags = Vec::new();
        if let Some(group) = &setting.group {
            tags.push(format!("group {}", group));
        }
        if let Some(key) = &setting.env {
            tags.push(format!("env {}", key));
        }
        if setting.flash {
            tags.push("flash".to_string());
        }
        if catalog.holder() == Some(setting.id.as_str()) {
            tags.push("holder".to_string());
        }

        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!("[{}]", tags.join(", "))
        };
        println!(
            "  {:<32} {:<8} {:<20} {}",
            setting.id.green(),
            setting.setting_type.to_string(),
            setting.default.to_string(),
            tags.dimmed()
        );
    }
    println!();
    println!("{} {}", "Total:".dimmed(), catalog);
    Ok(())
}

fn list_groups(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let environment: serde_json::Map<String, serde_json::Value> = catalog
            .env_bindings()
            .map(|(key, setting)| (key.to_string(), setting.into()))
            .collect();
        let value = serde_json::json!({
            "groups": catalog.groups(),
            "dependencies": catalog.dependencies(),
            "environment": environment,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Exclusion groups".bold());
    for group in catalog.groups() {
        println!("  {}: {}", group.id.cyan().bold(), group.members.join(", "));
    }
    println!();
    println!("{}", "Dependency rules".bold());
    for rule in catalog.dependencies() {
        println!("  {}", rule);
    }
    println!();
    println!("{}", "Environment keys".bold());
    for (key, setting) in catalog.env_bindings() {
        println!("  {:<12} {} {}", key.cyan(), "=>".dimmed(), setting);
    }
    Ok(())
}
