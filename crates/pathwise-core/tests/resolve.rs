//! End-to-end resolution against real directory trees.

use pathwise_core::resolver::{
    DiagnosticKind, Environment, FileCreateInvalidation, PnpApi, PnpError, Resolution,
    ResolveOutput, ResolveRequest, Resolver,
};
use pathwise_core::ResolverConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        Self { _dir: dir, root }
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn resolver(&self) -> Resolver {
        Resolver::with_os_fs(ResolverConfig::new(&self.root))
    }
}

fn resolve(r: &Resolver, spec: &str, referrer: &Path) -> ResolveOutput {
    r.resolve(&ResolveRequest::new(spec, Some(referrer.to_path_buf())))
        .unwrap()
}

fn resolved_path(out: &ResolveOutput) -> &Path {
    match &out.resolution {
        Resolution::Resolved(m) => &m.file_path,
        other => panic!("expected a resolved module, got {other:?}"),
    }
}

#[test]
fn test_missing_absolute_specifier_is_file_not_found_under_root() {
    let fx = Fixture::new();
    let referrer = fx.write("src/deep/index.js", "");
    let r = fx.resolver();

    let out = resolve(&r, "/lib/missing", &referrer);
    let diag = out.diagnostic().unwrap();
    assert_eq!(diag.kind, DiagnosticKind::FileNotFound);
    assert_eq!(diag.message, "Cannot load file '../../lib/missing' in './src/deep'.");
    assert!(out
        .invalidations
        .invalidate_on_file_create
        .contains(&FileCreateInvalidation::path(fx.root.join("lib/missing.js"))));
}

#[test]
fn test_absolute_specifier_resolves_under_root() {
    let fx = Fixture::new();
    let referrer = fx.write("src/deep/index.js", "");
    let target = fx.write("lib/util.ts", "");

    let out = resolve(&fx.resolver(), "/lib/util", &referrer);
    assert_eq!(resolved_path(&out), target);
}

#[test]
fn test_tilde_specifier_uses_nearest_package_root() {
    let fx = Fixture::new();
    fx.write("package.json", "{}");
    fx.write("packages/ui/package.json", r#"{"name": "ui"}"#);
    let theme = fx.write("packages/ui/theme.js", "");
    let referrer = fx.write("packages/ui/src/components/Button.js", "");

    let out = resolve(&fx.resolver(), "~/theme", &referrer);
    assert_eq!(resolved_path(&out), theme);
}

#[test]
fn test_glob_alias_rewrites_path() {
    let fx = Fixture::new();
    fx.write(
        "package.json",
        r#"{"alias": {"./components/*": "./shared/$1"}}"#,
    );
    let referrer = fx.write("index.js", "");
    let button = fx.write("shared/button.js", "");

    let out = resolve(&fx.resolver(), "./components/button", &referrer);
    assert_eq!(resolved_path(&out), button);
}

#[test]
fn test_glob_alias_cycle_terminates() {
    let fx = Fixture::new();
    fx.write(
        "package.json",
        r#"{"alias": {"./a/*": "./b/$1", "./b/*": "./a/$1"}}"#,
    );
    let referrer = fx.write("index.js", "");
    let target = fx.write("b/x.js", "");

    let out = resolve(&fx.resolver(), "./a/x", &referrer);
    assert_eq!(resolved_path(&out), target);
}

#[test]
fn test_file_alias_chain_reaches_last_file() {
    let fx = Fixture::new();
    fx.write(
        "package.json",
        r#"{"alias": {"./a.js": "./b.js", "./b.js": "./c.js"}}"#,
    );
    let referrer = fx.write("index.js", "");
    let c = fx.write("c.js", "");

    let out = resolve(&fx.resolver(), "./a", &referrer);
    assert_eq!(resolved_path(&out), c);
}

#[test]
fn test_unmatched_alias_lookup_is_stable() {
    let fx = Fixture::new();
    fx.write("package.json", r#"{"alias": {"react": "preact/compat"}}"#);
    let referrer = fx.write("src/index.js", "");
    let local = fx.write("src/local.js", "");
    let r = fx.resolver();

    let first = resolve(&r, "./local", &referrer);
    let second = resolve(&r, "./local", &referrer);
    assert_eq!(resolved_path(&first), local);
    assert_eq!(first.resolution, second.resolution);
}

#[test]
fn test_entry_field_priority() {
    let fx = Fixture::new();
    fx.write(
        "node_modules/pkg/package.json",
        r#"{"main": "a.js", "module": "b.js", "browser": "c.js"}"#,
    );
    fx.write("node_modules/pkg/a.js", "");
    let b = fx.write("node_modules/pkg/b.js", "");
    let c = fx.write("node_modules/pkg/c.js", "");
    let referrer = fx.write("src/index.js", "");
    let r = fx.resolver();

    let out = resolve(&r, "pkg", &referrer);
    assert_eq!(resolved_path(&out), c);

    let node = ResolveRequest::new("pkg", Some(referrer)).with_env(Environment::node());
    let out = r.resolve(&node).unwrap();
    assert_eq!(resolved_path(&out), b);
}

#[test]
fn test_configured_main_fields_replace_defaults() {
    let fx = Fixture::new();
    fx.write(
        "node_modules/pkg/package.json",
        r#"{"main": "a.js", "module": "b.js"}"#,
    );
    let a = fx.write("node_modules/pkg/a.js", "");
    fx.write("node_modules/pkg/b.js", "");
    let referrer = fx.write("src/index.js", "");
    let r = Resolver::with_os_fs(ResolverConfig::new(&fx.root).with_main_fields(["main"]));

    let request = ResolveRequest::new("pkg", Some(referrer)).with_env(Environment::node());
    let out = r.resolve(&request).unwrap();
    assert_eq!(resolved_path(&out), a);
}

#[test]
fn test_referrer_extension_tried_first() {
    let fx = Fixture::new();
    fx.write("src/foo.js", "");
    let ts = fx.write("src/foo.ts", "");
    let referrer = fx.write("src/index.ts", "");
    let r = Resolver::with_os_fs(ResolverConfig::new(&fx.root).with_extensions([".js", ".ts"]));

    let out = resolve(&r, "./foo", &referrer);
    assert_eq!(resolved_path(&out), ts);
}

#[test]
fn test_side_effects_from_package() {
    let fx = Fixture::new();
    fx.write(
        "node_modules/ui-kit/package.json",
        r#"{"main": "src/index.js", "sideEffects": ["*.css"]}"#,
    );
    fx.write("node_modules/ui-kit/src/index.js", "");
    fx.write("node_modules/ui-kit/styles/app.css", "");
    let referrer = fx.write("src/index.js", "");
    let r = fx.resolver();

    let js = resolve(&r, "ui-kit", &referrer);
    assert_eq!(js.module().unwrap().side_effects, Some(false));

    let css = resolve(&r, "ui-kit/styles/app.css", &referrer);
    assert_eq!(css.module().unwrap().side_effects, None);
}

#[test]
fn test_missing_module_resolves_after_creation() {
    let fx = Fixture::new();
    let referrer = fx.write("src/index.js", "");
    let r = fx.resolver();

    let out = resolve(&r, "left-pad", &referrer);
    assert_eq!(out.diagnostic().unwrap().kind, DiagnosticKind::ModuleNotFound);
    let watches: Vec<_> = out
        .invalidations
        .invalidate_on_file_create
        .iter()
        .filter(|inv| {
            matches!(inv, FileCreateInvalidation::AboveFilePath { file_name, .. }
                if file_name.starts_with("node_modules/"))
        })
        .collect();
    assert_eq!(
        watches,
        vec![&FileCreateInvalidation::above("node_modules/left-pad", &referrer)]
    );

    fx.write("node_modules/left-pad/package.json", r#"{"main": "index.js"}"#);
    let index = fx.write("node_modules/left-pad/index.js", "");

    let out = resolve(&r, "left-pad", &referrer);
    assert_eq!(resolved_path(&out), index);
}

#[test]
fn test_sub_path_bypasses_entry_fields() {
    let fx = Fixture::new();
    fx.write("node_modules/lodash/package.json", r#"{"main": "lodash.js"}"#);
    fx.write("node_modules/lodash/lodash.js", "");
    let map = fx.write("node_modules/lodash/map.js", "");
    let referrer = fx.write("src/index.js", "");

    let out = resolve(&fx.resolver(), "lodash/map", &referrer);
    assert_eq!(resolved_path(&out), map);
}

#[test]
fn test_module_not_found_suggests_alternatives() {
    let fx = Fixture::new();
    fx.write("node_modules/lodash/index.js", "");
    let referrer = fx.write("src/index.js", "");

    let out = resolve(&fx.resolver(), "lodahs", &referrer);
    let diag = out.diagnostic().unwrap();
    assert_eq!(diag.kind, DiagnosticKind::ModuleNotFound);
    assert_eq!(diag.hints, vec!["Did you mean 'lodash'?"]);
}

#[test]
fn test_browser_false_yields_empty_module() {
    let fx = Fixture::new();
    fx.write(
        "node_modules/http-client/package.json",
        r#"{"main": "index.js", "browser": {"./node-transport.js": false}}"#,
    );
    let index = fx.write("node_modules/http-client/index.js", "");
    fx.write("node_modules/http-client/node-transport.js", "");
    let r = fx.resolver();

    let out = resolve(&r, "./node-transport", &index);
    let module = out.module().unwrap();
    assert_eq!(module.file_path, r.config().empty_shim_path());
    assert_eq!(module.code.as_deref(), Some(""));

    let node = ResolveRequest::new("./node-transport", Some(index.clone()))
        .with_env(Environment::node());
    let out = r.resolve(&node).unwrap();
    assert_eq!(resolved_path(&out), index.with_file_name("node-transport.js"));
}

#[test]
fn test_url_specifier_is_relative() {
    let fx = Fixture::new();
    let logo = fx.write("src/logo.png", "");
    let referrer = fx.write("src/styles.css", "");

    let request = ResolveRequest::new("logo.png", Some(referrer)).with_url(true);
    let out = fx.resolver().resolve(&request).unwrap();
    assert_eq!(resolved_path(&out), logo);
}

#[test]
fn test_package_json_change_watches_are_unique() {
    let fx = Fixture::new();
    fx.write("package.json", r#"{"name": "app"}"#);
    let referrer = fx.write("src/index.js", "");
    fx.write("src/a.js", "");

    let out = resolve(&fx.resolver(), "./a", &referrer);
    assert_eq!(
        out.invalidations.invalidate_on_file_change,
        vec![fx.root.join("package.json")]
    );
}

#[test]
fn test_concurrent_resolutions_share_cache() {
    let fx = Fixture::new();
    fx.write("package.json", r#"{"name": "app"}"#);
    for name in ["alpha", "beta", "gamma"] {
        fx.write(
            &format!("node_modules/{name}/package.json"),
            r#"{"main": "main.js"}"#,
        );
        fx.write(&format!("node_modules/{name}/main.js"), "");
    }
    let referrer = fx.write("src/index.js", "");
    let r = Arc::new(fx.resolver());

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let r = Arc::clone(&r);
            let referrer = referrer.clone();
            std::thread::spawn(move || {
                let name = ["alpha", "beta", "gamma"][i % 3];
                let out = r
                    .resolve(&ResolveRequest::new(name, Some(referrer)))
                    .unwrap();
                (name, out)
            })
        })
        .collect();

    for handle in handles {
        let (name, out) = handle.join().unwrap();
        let path = out.module().unwrap().file_path.clone();
        assert!(path.ends_with(format!("node_modules/{name}/main.js")));
        assert!(out
            .invalidations
            .invalidate_on_file_change
            .iter()
            .any(|p| p.ends_with(format!("node_modules/{name}/package.json"))));
    }

    // Root package plus three modules.
    assert_eq!(r.cache().len(), 4);
}

#[derive(Debug)]
struct StaticPnp {
    manifest: PathBuf,
    modules: Vec<(&'static str, PathBuf)>,
}

impl PnpApi for StaticPnp {
    fn resolve_to_unqualified(
        &self,
        request: &str,
        _issuer: &Path,
    ) -> Result<Option<PathBuf>, PnpError> {
        if request == "broken" {
            return Err(PnpError::Other("corrupt manifest".into()));
        }
        Ok(self
            .modules
            .iter()
            .find(|(name, _)| *name == request)
            .map(|(_, dir)| dir.clone()))
    }

    fn manifest_path(&self) -> PathBuf {
        self.manifest.clone()
    }
}

#[test]
fn test_pnp_fallback() {
    let fx = Fixture::new();
    let manifest = fx.write(".pnp.cjs", "");
    fx.write("cache/react/package.json", r#"{"main": "index.js"}"#);
    let react = fx.write("cache/react/index.js", "");
    let referrer = fx.write("src/index.js", "");

    let r = fx.resolver().with_pnp(Arc::new(StaticPnp {
        manifest: manifest.clone(),
        modules: vec![("react", fx.root.join("cache/react"))],
    }));

    let out = resolve(&r, "react", &referrer);
    assert_eq!(resolved_path(&out), react);
    assert!(out.invalidations.invalidate_on_file_change.contains(&manifest));

    let out = resolve(&r, "vue", &referrer);
    assert_eq!(out.diagnostic().unwrap().kind, DiagnosticKind::ModuleNotFound);

    let out = resolve(&r, "broken", &referrer);
    assert!(out.is_excluded());
}
