use serde::{Deserialize, Serialize};

/// Markup conventions shared by the export and import directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Columns of indentation per nesting level in source units
    pub indent_width: usize,

    /// Tag of collapsible sections (content is not indented, metadata is)
    pub collapsible_tag: String,

    /// Tag of raw containers (content is indented under the marker)
    pub container_tag: String,

    /// Selector marking a container block as a list container
    pub list_container: String,

    /// Element name marking a container block as a list item
    pub list_item: String,

    /// Metadata key prefix naming the kind of a collapsible section
    pub kind_key: String,

    /// Metadata key prefix carrying the open state of a collapsible section
    pub state_key: String,

    /// Inline control conventions
    pub controls: ControlRules,
}

/// Conventions for embedded checkbox controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRules {
    /// Id prefix of identity-keyed controls
    pub identity_prefix: String,

    /// Name prefix of name-keyed controls
    pub name_prefix: String,

    /// Class attribute written on identity-keyed controls
    pub identity_class: String,

    /// Class attribute written on name-keyed controls
    pub name_class: String,

    /// `onchange` handler attached to identity-keyed controls
    pub toggle_hook: String,
}

impl Grammar {
    /// Whether a trimmed line is one of the metadata lines
    pub fn is_metadata(&self, trimmed: &str) -> bool {
        self.metadata_key(trimmed).is_some()
    }

    /// The metadata key a trimmed line starts with, if any
    pub fn metadata_key(&self, trimmed: &str) -> Option<&str> {
        [self.kind_key.as_str(), self.state_key.as_str()]
            .into_iter()
            .find(|key| !key.is_empty() && trimmed.starts_with(key))
    }

    pub fn is_kind_line(&self, trimmed: &str) -> bool {
        !self.kind_key.is_empty() && trimmed.starts_with(&self.kind_key)
    }

    pub fn is_state_line(&self, trimmed: &str) -> bool {
        !self.state_key.is_empty() && trimmed.starts_with(&self.state_key)
    }

    pub fn is_collapsible(&self, tag: &str) -> bool {
        tag == self.collapsible_tag
    }

    /// A container block whose selector starts with the list container selector
    pub fn is_list_container(&self, tag: &str, parameter: &str) -> bool {
        tag == self.container_tag
            && !self.list_container.is_empty()
            && parameter.starts_with(&self.list_container)
    }

    /// A container block whose selector names the list item element
    pub fn is_list_item(&self, tag: &str, parameter: &str) -> bool {
        tag == self.container_tag
            && !self.list_item.is_empty()
            && element_name(parameter) == self.list_item
    }

    /// Extra indentation given to the children of a block when restoring source form
    ///
    /// Collapsible sections do not indent their content, list containers and list items indent
    /// by half a level, everything else by a full level.
    pub fn child_step(&self, tag: &str, parameter: &str) -> usize {
        if self.is_collapsible(tag) {
            0
        } else if self.is_list_container(tag, parameter) || self.is_list_item(tag, parameter) {
            self.indent_width / 2
        } else {
            self.indent_width
        }
    }
}

/// `li.done#first` → `li`
fn element_name(selector: &str) -> &str {
    selector
        .split(|c: char| c == '.' || c == '#' || c.is_whitespace())
        .next()
        .unwrap_or_default()
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            indent_width: 4,
            collapsible_tag: "details".to_string(),
            container_tag: "html".to_string(),
            list_container: "ul.tasklist".to_string(),
            list_item: "li".to_string(),
            kind_key: "type:".to_string(),
            state_key: "open:".to_string(),
            controls: ControlRules::default(),
        }
    }
}

impl Default for ControlRules {
    fn default() -> Self {
        Self {
            identity_prefix: "cb-".to_string(),
            name_prefix: "pledge_".to_string(),
            identity_class: "cb-sa".to_string(),
            name_class: "data-input".to_string(),
            toggle_hook: "toggleCheckboxes(event)".to_string(),
        }
    }
}
