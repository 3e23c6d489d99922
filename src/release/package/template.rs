//! Debian control file template.

/// `DEBIAN/control` rendered with handlebars. Empty relationship fields are
/// left out.
pub const CONTROL_TEMPLATE: &str = r#"Package: {{package}}
Version: {{version}}
Section: {{section}}
Priority: {{priority}}
Architecture: {{arch}}
{{#if depends}}Depends: {{depends}}
{{/if}}{{#if provides}}Provides: {{provides}}
{{/if}}Installed-Size: {{installed_size}}
Maintainer: {{maintainer}}
Bugs: {{bugs}}
Homepage: {{homepage}}
Description: {{short_description}}
 {{long_description}}
"#;
