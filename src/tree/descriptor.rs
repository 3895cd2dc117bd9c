//! Root command descriptors.

use crate::error::RegistrationError;

/// Metadata for one root command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    player_only: bool,
    hidden: bool,
}

impl CommandDescriptor {
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            player_only: false,
            hidden: false,
        }
    }

    /// Canonical (lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn is_player_only(&self) -> bool {
        self.player_only
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Name followed by aliases.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.labels().any(|l| l.eq_ignore_ascii_case(label))
    }
}

/// Builder for [`CommandDescriptor`].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    player_only: bool,
    hidden: bool,
}

impl DescriptorBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission(mut self, node: impl Into<String>) -> Self {
        self.permission = Some(node.into());
        self
    }

    pub fn player_only(mut self) -> Self {
        self.player_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn build(self) -> Result<CommandDescriptor, RegistrationError> {
        let name = normalize_label(&self.name)?;
        let mut aliases: Vec<String> = Vec::with_capacity(self.aliases.len());
        for alias in &self.aliases {
            let alias = normalize_label(alias)?;
            if alias != name && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        Ok(CommandDescriptor {
            name,
            aliases,
            description: self.description,
            permission: self.permission,
            player_only: self.player_only,
            hidden: self.hidden,
        })
    }
}

/// Lowercase a label, rejecting empty names and embedded whitespace.
pub(crate) fn normalize_label(raw: &str) -> Result<String, RegistrationError> {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidName(raw.to_string()));
    }
    Ok(raw.to_lowercase())
}
