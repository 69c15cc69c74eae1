use std::sync::LazyLock;

use regex::Regex;

static HEADER_2008: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Microsoft Visual Studio Solution File, Format Version 11\.00(?P<nl>\r?\n)# Visual Studio 2008(?P<end>\r?\n|$)",
    )
    .expect("solution header pattern is valid")
});

const HEADER_2012: &str =
    "Microsoft Visual Studio Solution File, Format Version 12.00${nl}# Visual Studio 2012${end}";

const PROPERTIES_START: &str = "GlobalSection(SolutionProperties) = preSolution";
const PROPERTIES_END: &str = "EndGlobalSection";

/// Upgrades the 2008 solution header and drops the solution properties
/// section the host writes.
pub fn scrub(content: &str) -> String {
    let mut content = HEADER_2008.replacen(content, 1, HEADER_2012).into_owned();

    if let Some(start) = content.find(PROPERTIES_START) {
        match content[start..].find(PROPERTIES_END) {
            Some(end) => {
                content.replace_range(start..start + end + PROPERTIES_END.len(), "");
            }
            None => log::warn!("[patch] solution properties section at byte {start} is never closed"),
        }
    }

    content
}
