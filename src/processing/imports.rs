//! Transitive import resolution for views.
//!
//! Resolution operates on canonical namespace names. Per view, a seed set is
//! gathered from the code-behind's directives, from code units the markup
//! already references as scripts, and from binding support; the seed set is
//! closed over the namespace-import relation with cycle and missing-name
//! detection; finally the closure is filtered against everything the view's
//! ancestors already import, because re-importing in a descendant is
//! redundant and risks duplicate-declaration errors in the target markup.
//!
//! Ancestors are always fully processed (resolution and injection) before a
//! descendant is filtered - the de-duplication is only correct against a
//! settled ancestor state.

use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::Result;

use crate::error::ProcessError;
use crate::feedback::FeedbackChannel;
use crate::markup;
use crate::processing::injector::MarkupInjector;
use crate::project::file::FileId;
use crate::project::registry::FileRegistry;
use crate::settings::{BINDING_SUPPORT_NAMESPACES, ProcessorSettings};

pub struct ImportResolver<'a> {
    settings: &'a ProcessorSettings,
    /// Closure per root namespace name (lowercased key), reused across
    /// sibling views within one build.
    closure_memo: HashMap<String, BTreeSet<String>>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(settings: &'a ProcessorSettings) -> Self {
        Self {
            settings,
            closure_memo: HashMap::new(),
        }
    }

    /// Resolve and inject imports for a view, ancestors first.
    ///
    /// Processing a view twice is a no-op. A failure in an ancestor aborts
    /// the descendant too: the descendant cannot filter against an ancestor
    /// that never settled.
    pub fn add_imports_to_view(
        &mut self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<()> {
        let kind = registry.get(id).kind();
        if !kind.is_markup() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "markup",
                kind: kind.to_string(),
            }
            .into());
        }

        if registry.get(id).has_processed_imports {
            return Ok(());
        }

        if let Some(parent) = registry.get(id).parent_file
            && !registry.get(parent).has_processed_imports
        {
            self.add_imports_to_view(registry, feedback, parent)?;
        }

        self.resolve(registry, feedback, id)?;
        MarkupInjector::new(self.settings).inject(registry, feedback, id)?;
        registry.get_mut(id).has_processed_imports = true;
        Ok(())
    }

    /// Compute `required_namespaces` (full closure) and
    /// `imported_namespaces` (closure minus ancestor-provided names) for a
    /// view. Missing or cyclic imports abort the view with no partial
    /// result retained.
    pub fn resolve(
        &mut self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<()> {
        let kind = registry.get(id).kind();
        if !kind.is_markup() {
            return Err(ProcessError::UnsupportedFileKind {
                expected: "markup",
                kind: kind.to_string(),
            }
            .into());
        }

        let seeds = self.collect_seeds(registry, feedback, id)?;

        let mut closure = BTreeSet::new();
        let view_path = registry.get(id).path_string();
        for seed in &seeds {
            self.close_over(registry, feedback, &view_path, seed, &mut closure)?;
        }

        let inherited = inherited_namespaces(registry, id);
        let required: Vec<String> = closure.iter().cloned().collect();
        let imported: Vec<String> = required
            .iter()
            .filter(|name| !inherited.contains(&name.to_lowercase()))
            .cloned()
            .collect();

        let file = registry.get_mut(id);
        file.required_namespaces = required;
        file.imported_namespaces = imported;
        Ok(())
    }

    /// Root namespace names for one view: code-behind directives, imports of
    /// script-referenced code units, and binding support.
    fn collect_seeds(
        &self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        id: FileId,
    ) -> Result<BTreeSet<String>> {
        let mut seeds = BTreeSet::new();

        let associated = registry.get(id).associated_file;
        if let Some(code_behind) = associated {
            seeds.extend(registry.get(code_behind).imported_namespace_names.iter().cloned());
        }

        let view_path = registry.get(id).path_string();
        let contents = registry.get_mut(id).contents()?.to_owned();
        for pkg_path in markup::script_include_paths(self.settings, &contents) {
            let Some(script_id) = registry.id_by_pkg_path(&pkg_path) else {
                feedback.error(
                    Some(&view_path),
                    format!("markup references a script that cannot be found: {}", pkg_path),
                );
                return Err(ProcessError::MissingNamespace { name: pkg_path }.into());
            };
            if Some(script_id) == associated {
                continue;
            }
            seeds.extend(
                registry
                    .get(script_id)
                    .imported_namespace_names
                    .iter()
                    .cloned(),
            );
        }

        if !registry.get(id).bindings.is_empty() {
            for name in BINDING_SUPPORT_NAMESPACES {
                seeds.insert(name.to_owned());
            }
        }

        Ok(seeds)
    }

    /// Union the transitive closure of `root` into `out`.
    ///
    /// Depth-first over the namespace-import relation with an explicit frame
    /// stack; the active path is a plain set, so the cycle check is one
    /// membership test. The closure of each root is memoized once it
    /// completes (a root that fails is never cached).
    fn close_over(
        &mut self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        view_path: &str,
        root: &str,
        out: &mut BTreeSet<String>,
    ) -> Result<()> {
        let root_key = root.to_lowercase();
        if let Some(cached) = self.closure_memo.get(&root_key) {
            out.extend(cached.iter().cloned());
            return Ok(());
        }

        let mut result: BTreeSet<String> = BTreeSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut path: HashSet<String> = HashSet::new();

        let mut stack = vec![self.open_frame(registry, feedback, view_path, root)?];
        path.insert(root_key.clone());
        visited.insert(root_key.clone());

        while let Some(frame) = stack.last_mut() {
            let Some(next) = frame.pending.pop() else {
                if let Some(done) = stack.pop() {
                    path.remove(&done.name.to_lowercase());
                    result.insert(done.name);
                }
                continue;
            };

            let next_key = next.to_lowercase();
            if path.contains(&next_key) {
                let origin = frame.name.clone();
                feedback.error(
                    Some(view_path),
                    format!(
                        "cyclical import detected - an infinite import cycle was found on \"{}\" when resolving imports of \"{}\"",
                        next, origin
                    ),
                );
                return Err(ProcessError::CyclicalImport { origin, name: next }.into());
            }
            if !visited.insert(next_key.clone()) {
                continue;
            }

            let next_frame = self.open_frame(registry, feedback, view_path, &next)?;
            path.insert(next_key);
            stack.push(next_frame);
        }

        self.closure_memo.insert(root_key, result.clone());
        out.extend(result);
        Ok(())
    }

    /// Look up a namespace and produce its DFS frame: the canonical name and
    /// the direct import names of its declaring file.
    fn open_frame(
        &self,
        registry: &mut FileRegistry,
        feedback: &mut FeedbackChannel,
        view_path: &str,
        name: &str,
    ) -> Result<Frame> {
        let Some(namespace) = registry.namespace_by_name(name) else {
            feedback.error(
                Some(view_path),
                format!("missing import - no namespace named \"{}\" is declared", name),
            );
            return Err(ProcessError::MissingNamespace {
                name: name.to_owned(),
            }
            .into());
        };
        let canonical = namespace.name().to_owned();
        let declaring_file = namespace.file();
        let mut pending: Vec<String> = registry
            .get(declaring_file)
            .imported_namespace_names
            .iter()
            .cloned()
            .collect();
        // Popped from the back; reverse so imports are visited in declared
        // (sorted) order.
        pending.reverse();
        Ok(Frame {
            name: canonical,
            pending,
        })
    }
}

struct Frame {
    name: String,
    pending: Vec<String>,
}

/// Every namespace name (lowercased) already made available by an
/// ancestor's own resolved import set.
fn inherited_namespaces(registry: &FileRegistry, id: FileId) -> HashSet<String> {
    let mut inherited = HashSet::new();
    let mut current = registry.get(id).parent_file;
    while let Some(ancestor) = current {
        inherited.extend(
            registry
                .get(ancestor)
                .imported_namespaces
                .iter()
                .map(|n| n.to_lowercase()),
        );
        current = registry.get(ancestor).parent_file;
    }
    inherited
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::processing::namespaces::NamespaceProcessor;
    use crate::project::file::SourceFile;

    struct Fixture {
        settings: ProcessorSettings,
        registry: FileRegistry,
        feedback: FeedbackChannel,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                settings: ProcessorSettings::default(),
                registry: FileRegistry::new(),
                feedback: FeedbackChannel::new(),
            }
        }

        fn add(&mut self, pkg: &str, contents: &str) -> FileId {
            let mut file = SourceFile::new(PathBuf::from(format!("/p/{pkg}")), pkg.to_owned());
            file.preload_contents(contents.to_owned());
            self.registry.add_file(file)
        }

        /// Register a mixin declaring `name` and importing `imports`.
        fn mixin(&mut self, name: &str, imports: &[&str]) -> FileId {
            let mut contents = format!("'@Namespace {name}\n");
            for import in imports {
                contents.push_str(&format!("'@Import {import}\n"));
            }
            contents.push_str("sub init()\nend sub\n");
            let id = self.add(&format!("source/{name}.brs"), &contents);
            self.prepare_code(id);
            id
        }

        fn prepare_code(&mut self, id: FileId) {
            let processor = NamespaceProcessor::new(&self.settings);
            processor
                .extract_namespace(&mut self.registry, &mut self.feedback, id)
                .unwrap();
            processor
                .scan_import_names(&mut self.registry, id)
                .unwrap();
        }

        /// Register a view plus code-behind whose directives import `imports`.
        fn view(&mut self, name: &str, imports: &[&str]) -> FileId {
            let xml = format!("<component name=\"{name}\">\n</component>\n");
            let view_id = self.add(&format!("views/{name}.xml"), &xml);

            let mut brs = String::new();
            for import in imports {
                brs.push_str(&format!("'@Import {import}\n"));
            }
            brs.push_str("sub init()\nend sub\n");
            let code_id = self.add(&format!("views/{name}.brs"), &brs);
            self.registry.associate(view_id, code_id);
            self.prepare_code(code_id);
            view_id
        }

        fn resolve(&mut self, id: FileId) -> Result<()> {
            ImportResolver::new(&self.settings).resolve(
                &mut self.registry,
                &mut self.feedback,
                id,
            )
        }
    }

    #[test]
    fn test_chain_closure() {
        let mut fx = Fixture::new();
        fx.mixin("B", &["C"]);
        fx.mixin("C", &[]);
        let view = fx.view("Home", &["B"]);

        fx.resolve(view).unwrap();

        let file = fx.registry.get(view);
        assert_eq!(file.required_namespaces, vec!["B", "C"]);
        assert_eq!(file.imported_namespaces, vec!["B", "C"]);
        assert!(!fx.feedback.has_errors());
    }

    #[test]
    fn test_cycle_is_detected() {
        let mut fx = Fixture::new();
        fx.mixin("A", &["B"]);
        fx.mixin("B", &["A"]);
        let view = fx.view("Home", &["A"]);

        let err = fx.resolve(view).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::CyclicalImport { .. })
        ));
        assert!(fx.feedback.has_errors());
        // Fail fast: no partial result retained.
        assert!(fx.registry.get(view).required_namespaces.is_empty());
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let mut fx = Fixture::new();
        fx.mixin("A", &["A"]);
        let view = fx.view("Home", &["A"]);

        let err = fx.resolve(view).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::CyclicalImport { .. })
        ));
    }

    #[test]
    fn test_missing_namespace() {
        let mut fx = Fixture::new();
        let view = fx.view("Home", &["Ghost"]);

        let err = fx.resolve(view).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::MissingNamespace { name }) if name == "Ghost"
        ));
        assert!(fx.feedback.has_errors());
    }

    #[test]
    fn test_diamond_dependencies_resolve_once() {
        let mut fx = Fixture::new();
        fx.mixin("Left", &["Shared"]);
        fx.mixin("Right", &["Shared"]);
        fx.mixin("Shared", &[]);
        let view = fx.view("Home", &["Left", "Right"]);

        fx.resolve(view).unwrap();
        assert_eq!(
            fx.registry.get(view).required_namespaces,
            vec!["Left", "Right", "Shared"]
        );
    }

    #[test]
    fn test_inheritance_filtering() {
        let mut fx = Fixture::new();
        fx.mixin("X", &[]);
        fx.mixin("Y", &[]);
        let base = fx.view("Base", &["X"]);
        let child = fx.view("Child", &["X", "Y"]);
        fx.registry.get_mut(child).parent_file = Some(base);

        let mut resolver = ImportResolver::new(&fx.settings);
        resolver
            .resolve(&mut fx.registry, &mut fx.feedback, base)
            .unwrap();
        fx.registry.get_mut(base).has_processed_imports = true;
        resolver
            .resolve(&mut fx.registry, &mut fx.feedback, child)
            .unwrap();

        let child_file = fx.registry.get(child);
        assert_eq!(child_file.required_namespaces, vec!["X", "Y"]);
        assert_eq!(child_file.imported_namespaces, vec!["Y"]);
    }

    #[test]
    fn test_script_referenced_code_units_seed_the_closure() {
        let mut fx = Fixture::new();
        fx.mixin("Deep", &[]);
        // A plain code unit the view references directly via <script>;
        // its own imports flow into the view.
        let helper = fx.add(
            "source/Helper.brs",
            "'@Import Deep\nsub help()\nend sub\n",
        );
        fx.prepare_code(helper);

        let xml = concat!(
            "<component name=\"Home\">\n",
            "<script type=\"text/brightscript\" uri=\"pkg:/source/Helper.brs\" />\n",
            "</component>\n"
        );
        let view = fx.add("views/Home.xml", xml);

        fx.resolve(view).unwrap();
        assert_eq!(fx.registry.get(view).required_namespaces, vec!["Deep"]);
    }

    #[test]
    fn test_missing_script_reference_fails() {
        let mut fx = Fixture::new();
        let xml = concat!(
            "<component name=\"Home\">\n",
            "<script type=\"text/brightscript\" uri=\"pkg:/source/Ghost.brs\" />\n",
            "</component>\n"
        );
        let view = fx.add("views/Home.xml", xml);

        let err = fx.resolve(view).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::MissingNamespace { .. })
        ));
    }

    #[test]
    fn test_bindings_force_support_namespaces() {
        let mut fx = Fixture::new();
        fx.mixin("ObservableMixin", &[]);
        fx.mixin("BaseObservable", &[]);
        let view = fx.view("Home", &[]);
        fx.registry.get_mut(view).bindings.push(Default::default());

        fx.resolve(view).unwrap();
        assert_eq!(
            fx.registry.get(view).required_namespaces,
            vec!["BaseObservable", "ObservableMixin"]
        );
    }

    #[test]
    fn test_add_imports_processes_ancestors_first() {
        let mut fx = Fixture::new();
        fx.mixin("X", &[]);
        fx.mixin("Y", &[]);
        let base = fx.view("Base", &["X"]);
        let child = fx.view("Child", &["X", "Y"]);
        fx.registry.get_mut(child).parent_file = Some(base);

        let mut resolver = ImportResolver::new(&fx.settings);
        // Processing the child alone must settle the parent first.
        resolver
            .add_imports_to_view(&mut fx.registry, &mut fx.feedback, child)
            .unwrap();

        assert!(fx.registry.get(base).has_processed_imports);
        assert_eq!(fx.registry.get(child).imported_namespaces, vec!["Y"]);

        let base_text = fx.registry.get_mut(base).contents().unwrap().to_owned();
        assert!(base_text.contains("uri=\"pkg:/source/X.brs\""));
        let child_text = fx.registry.get_mut(child).contents().unwrap().to_owned();
        assert!(child_text.contains("uri=\"pkg:/source/Y.brs\""));
        assert!(!child_text.contains("uri=\"pkg:/source/X.brs\""));
    }

    #[test]
    fn test_add_imports_is_idempotent() {
        let mut fx = Fixture::new();
        fx.mixin("X", &[]);
        let view = fx.view("Home", &["X"]);

        let mut resolver = ImportResolver::new(&fx.settings);
        resolver
            .add_imports_to_view(&mut fx.registry, &mut fx.feedback, view)
            .unwrap();
        let once = fx.registry.get_mut(view).contents().unwrap().to_owned();

        resolver
            .add_imports_to_view(&mut fx.registry, &mut fx.feedback, view)
            .unwrap();
        let twice = fx.registry.get_mut(view).contents().unwrap().to_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rejects_code_files() {
        let mut fx = Fixture::new();
        let id = fx.add("source/A.brs", "sub init()\nend sub");

        let err = ImportResolver::new(&fx.settings)
            .add_imports_to_view(&mut fx.registry, &mut fx.feedback, id)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProcessError>(),
            Some(ProcessError::UnsupportedFileKind { .. })
        ));
    }
}
