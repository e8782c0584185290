use serde::Serialize;

/// One or more externally hosted resources providing a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntryPoints {
    Single(&'static str),
    Multiple(&'static [&'static str]),
}

/// Maps an import name onto a global symbol supplied by CDN-hosted
/// script/style resources, so build tooling can externalize the import
/// instead of bundling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExternalDependency {
    pub module: &'static str,
    pub global: &'static str,
    pub entry: EntryPoints,
}

/// The external dependencies of the application shell, in resolution order.
pub const EXTERNAL_DEPENDENCIES: &[ExternalDependency] = &[
    ExternalDependency {
        module: "core-js",
        global: "CoreJs",
        entry: EntryPoints::Single("https://cdn.rio.cloud/libs/core-js/3.6.4/core-js.min.js"),
    },
    ExternalDependency {
        module: "react",
        global: "React",
        entry: EntryPoints::Single("https://cdn.rio.cloud/libs/react/16.10.2/react.min.js"),
    },
    ExternalDependency {
        module: "react-dom",
        global: "ReactDOM",
        entry: EntryPoints::Single("https://cdn.rio.cloud/libs/react-dom/16.10.2/react-dom.min.js"),
    },
    ExternalDependency {
        module: "rio-uikit",
        global: "RioUikit",
        entry: EntryPoints::Multiple(&[
            "https://uikit.developers.rio.cloud/0.13.7/rio-uikit.js",
            "https://uikit.developers.rio.cloud/0.13.7/rio-uikit.css",
        ]),
    },
    ExternalDependency {
        module: "rio-accountmenu",
        global: "RioAccountMenu",
        entry: EntryPoints::Single(
            "https://accountmenu.developers.rio.cloud/1.2.4/rio-accountmenu.js",
        ),
    },
    ExternalDependency {
        module: "rio-session-expired-info",
        global: "RioSessionExpiredInfo",
        entry: EntryPoints::Single(
            "https://session-expired-info.developers.rio.cloud/0.9.4/rio-session-expired-info.js",
        ),
    },
];

#[cfg(test)]
mod tests {
    use assertr::prelude::*;

    use super::*;

    #[test]
    fn manifest_keeps_resolution_order() {
        let modules: Vec<&str> = EXTERNAL_DEPENDENCIES.iter().map(|it| it.module).collect();
        assert_that(modules).is_equal_to(vec![
            "core-js",
            "react",
            "react-dom",
            "rio-uikit",
            "rio-accountmenu",
            "rio-session-expired-info",
        ]);
    }

    #[test]
    fn single_entries_serialize_as_strings() {
        let value = serde_json::to_value(EXTERNAL_DEPENDENCIES[0]).unwrap();
        assert_that(value["entry"].is_string()).is_true();
        assert_that(value["global"].as_str().unwrap()).is_equal_to("CoreJs");
        assert_that(value["module"].as_str().unwrap()).is_equal_to("core-js");
    }

    #[test]
    fn multi_entries_serialize_as_arrays() {
        let uikit = EXTERNAL_DEPENDENCIES
            .iter()
            .find(|it| it.module == "rio-uikit")
            .unwrap();
        let value = serde_json::to_value(uikit).unwrap();
        assert_that(value["entry"].is_array()).is_true();
        assert_that(value["entry"].as_array().unwrap().len()).is_equal_to(2);
    }

    #[test]
    fn manifest_serializes_in_order() {
        let value = serde_json::to_value(EXTERNAL_DEPENDENCIES).unwrap();
        let entries = value.as_array().unwrap();
        assert_that(entries.len()).is_equal_to(6);
        assert_that(entries[1]["global"].as_str().unwrap()).is_equal_to("React");
    }
}
