use std::{borrow::Cow, collections::BTreeMap};

use super::patch::{self, Insertion, PROPERTY_GROUP};

const FRAMEWORK_V35: &str = "<TargetFrameworkVersion>v3.5</TargetFrameworkVersion>";
const FRAMEWORK_V20: &str = "<TargetFrameworkVersion>v2.0</TargetFrameworkVersion>";

pub const LANG_VERSION: Insertion = Insertion {
    marker: "<LangVersion>",
    text: "<LangVersion>default</LangVersion>",
};

#[derive(Debug, Clone)]
pub struct ScrubOptions {
    /// Retarget v3.5 projects at v2.0, the profile mono editors resolve
    /// UnityEngine against outside of Windows.
    pub downgrade_framework: bool,
}

impl Default for ScrubOptions {
    fn default() -> Self {
        Self {
            downgrade_framework: !cfg!(target_os = "windows"),
        }
    }
}

/// Rewrites generated project text so external editors load it.
pub fn scrub(content: &str, options: &ScrubOptions) -> crate::Result<String> {
    if content.is_empty() {
        return Ok(String::new());
    }

    let content = if options.downgrade_framework && content.contains(FRAMEWORK_V35) {
        Cow::Owned(content.replace(FRAMEWORK_V35, FRAMEWORK_V20))
    } else {
        Cow::Borrowed(content)
    };

    patch::insert_missing(&content, &PROPERTY_GROUP, &[LANG_VERSION])
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default)]
    property_group: Vec<BTreeMap<String, String>>,
}

impl Project {
    pub fn parse(content: &str) -> crate::Result<Self> {
        Ok(serde_xml_rs::from_str(content)?)
    }

    /// First value of `name` across all property groups.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.property_group
            .iter()
            .find_map(|group| group.get(name))
            .map(String::as_str)
    }

    pub fn property_groups(&self) -> usize {
        self.property_group.len()
    }

    pub fn assembly_name(&self) -> Option<&str> {
        self.property("AssemblyName")
    }

    pub fn lang_version(&self) -> Option<&str> {
        self.property("LangVersion")
    }
}
