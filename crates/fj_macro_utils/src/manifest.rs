use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The parsed `Cargo.toml` of the crate invoking a proc-macro.
///
/// Generated code must name `fj` crates by a path that is valid from the
/// invoking crate, which may depend on `fj_codec` directly or only through
/// the umbrella crate.
///
/// # Example
///
/// ```rust
/// # use fj_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("fj_codec"));
/// ```
///
/// # Resolution rules
///
/// 1. A crate listed in `dependencies` resolves to `::crate_name`.
/// 2. A name starting with `fj_` resolves to `::fastjson::short_name` when the
///    caller depends on `fastjson` (e.g. `fj_codec` -> `::fastjson::codec`).
/// 3. Same with the umbrella crate `fj_core`, then with the alias `fj`.
/// 4. Steps 1-3 are repeated over `dev-dependencies`.
/// 5. Otherwise `::crate_name`.
///
/// A crate referring to itself should declare `extern crate self as name;`
/// so that the absolute path also works inside the crate.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FULL_NAME: &str = "fastjson";
const CORE_NAME: &str = "fj_core";
const SHORT_NAME: &str = "fj";
const CRATE_PREFIX: &str = "fj_";

impl Manifest {
    #[inline(never)]
    fn get_manifest_path() -> PathBuf {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(|path| {
                let mut path = PathBuf::from(path);
                path.push("Cargo.toml");
                assert!(
                    path.exists(),
                    "Cargo manifest does not exist at path {}",
                    path.display(),
                );
                path
            })
            .expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.")
    }

    #[inline(never)]
    fn get_manifest_modified_time(path: &Path) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(path).and_then(|metadata| metadata.modified())
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    fn path_of(root: &str, module: Option<&str>) -> syn::Path {
        let text = match module {
            Some(module) => format!("::{root}::{module}"),
            None => format!("::{root}"),
        };
        syn::parse_str(&text).unwrap_or_else(|_| panic!("`{text}` is not a valid path"))
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::path_of(name, None));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        [FULL_NAME, CORE_NAME, SHORT_NAME]
            .into_iter()
            .find(|root| deps.contains_key(root))
            .map(|root| Self::path_of(root, Some(module)))
    }

    /// Returns the path of the crate `name` as seen from the caller.
    ///
    /// See the type level documentation for the resolution order.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|key| match self.manifest.get(key) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::path_of(name, None))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when the file changes.
    /// Reading still costs a lock and a file stat, so call this once per
    /// macro invocation.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path = Self::get_manifest_path();
        let modified_time = Self::get_manifest_modified_time(&manifest_path)
            .expect("The Cargo.toml should have a modified time.");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };

        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}
