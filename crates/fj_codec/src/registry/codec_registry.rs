use alloc::sync::Arc;
use core::any::{Any, type_name};
use std::sync::{OnceLock, PoisonError, RwLock};

use log::debug;

use crate::error::{JsonError, JsonResult};
use crate::info::{BoxedValue, JsonType, TypeRef};
use crate::registry::session::Session;
use crate::registry::{Codec, CodecId, CodecTable, CompiledCodec};
use crate::settings::Settings;
use crate::shape::{Classifier, RegistryOptions, TypeShape};
use crate::value::JsonValue;

// -----------------------------------------------------------------------------
// CodecRegistry

/// Compiles and caches one codec per type.
///
/// See the [module documentation](crate::registry) for the compilation model.
///
/// # Examples
///
/// ```
/// use fj_codec::Json;
/// use fj_codec::registry::CodecRegistry;
/// use fj_codec::settings::Settings;
///
/// #[derive(Json, Default, Debug, PartialEq)]
/// pub struct Tree {
///     pub label: String,
///     pub children: Vec<Tree>,
/// }
///
/// let registry = CodecRegistry::new();
/// let tree = Tree {
///     label: "root".into(),
///     children: vec![Tree { label: "leaf".into(), children: vec![] }],
/// };
///
/// let text = registry.serialize(&tree, &Settings::default()).unwrap();
/// assert_eq!(text, r#"{"label":"root","children":[{"label":"leaf","children":[]}]}"#);
/// assert_eq!(registry.deserialize::<Tree>(&text, &Settings::default()).unwrap(), tree);
/// ```
pub struct CodecRegistry {
    classifier: Classifier,
    table: RwLock<Arc<CodecTable>>,
}

impl Default for CodecRegistry {
    /// See [`CodecRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Creates an empty registry with default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            classifier: Classifier::new(options),
            table: RwLock::new(Arc::default()),
        }
    }

    /// The process-wide registry used by the crate level functions.
    ///
    /// With the `auto_register` feature, types marked
    /// `#[json(auto_register)]` are compiled when it is first used.
    pub fn shared() -> &'static CodecRegistry {
        static SHARED: OnceLock<CodecRegistry> = OnceLock::new();
        SHARED.get_or_init(|| {
            let registry = CodecRegistry::new();
            registry.auto_register();
            registry
        })
    }

    #[inline]
    pub fn options(&self) -> RegistryOptions {
        self.classifier.options()
    }

    /// The classifier backing this registry.
    #[inline]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classifies `ty` without compiling it.
    #[inline]
    pub fn classify(&self, ty: TypeRef) -> JsonResult<Arc<TypeShape>> {
        self.classifier.classify(ty)
    }

    #[inline]
    fn snapshot(&self) -> Arc<CodecTable> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of compiled codecs, nested types included.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a codec for `ty` has been published.
    pub fn contains(&self, ty: TypeRef) -> bool {
        self.snapshot().id_of(ty.id()).is_some()
    }

    /// Returns the codec of a compiled object type by its type name.
    pub fn get_with_type_name(&self, name: &str) -> Option<CompiledCodec> {
        let table = self.snapshot();
        let id = table.id_by_name(name)?;
        Some(CompiledCodec::new(table, id))
    }

    /// Returns the codec of `ty`, compiling it and its nested types first if
    /// needed.
    ///
    /// Nothing is published when compilation fails.
    pub fn get_or_build(&self, ty: TypeRef) -> JsonResult<CompiledCodec> {
        let base = self.snapshot();
        if let Some(id) = base.id_of(ty.id()) {
            return Ok(CompiledCodec::new(base, id));
        }

        let mut session = Session::new(&self.classifier, &base);
        let root = session.link(ty)?;
        let codecs = session.finish()?;

        let (table, root) = self.publish(base.len(), codecs, root);
        Ok(CompiledCodec::new(table, root))
    }

    /// Typed shorthand for [`CodecRegistry::get_or_build`].
    #[inline]
    pub fn codec<T: JsonType>(&self) -> JsonResult<CompiledCodec> {
        self.get_or_build(TypeRef::of::<T>())
    }

    /// Appends the codecs of a finished session.
    ///
    /// Codecs of types that were published by another session meanwhile are
    /// dropped in favor of the published ones.
    fn publish(
        &self,
        base_len: usize,
        codecs: Vec<Codec>,
        root: CodecId,
    ) -> (Arc<CodecTable>, CodecId) {
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = guard.len();
        let mut redundant = 0_usize;
        let ids: Vec<CodecId> = codecs
            .iter()
            .map(|codec| match guard.id_of(codec.type_ref().id()) {
                Some(id) => {
                    redundant += 1;
                    id
                }
                None => {
                    next += 1;
                    CodecId::new(next - 1)
                }
            })
            .collect();

        let relink = |id: CodecId| {
            if id.index() < base_len {
                id
            } else {
                ids[id.index() - base_len]
            }
        };

        if redundant > 0 {
            debug!("dropped {redundant} codecs already published by another thread");
        }

        let published = guard.len();
        if next > published {
            let mut table = CodecTable::clone(&guard);
            for (mut codec, id) in codecs.into_iter().zip(&ids) {
                if id.index() < published {
                    continue;
                }
                codec.plan.relink(relink);
                table.push(codec);
            }
            debug!(
                "published {} codecs, {} in total",
                table.len() - published,
                table.len()
            );
            *guard = Arc::new(table);
        }

        (guard.clone(), relink(root))
    }

    // -------------------------------------------------------------------------
    // Auto registration

    /// Compiles every type marked `#[json(auto_register)]`.
    ///
    /// Returns the number of types compiled successfully. Types that fail are
    /// skipped with a warning. Without the `auto_register` feature this does
    /// nothing and returns `0`.
    pub fn auto_register(&self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::AutoRegistration;

            let mut count = 0;
            for entry in inventory::iter::<AutoRegistration> {
                let ty = (entry.0)();
                match self.get_or_build(ty) {
                    Ok(_) => count += 1,
                    Err(err) => log::warn!("cannot auto register `{}`: {err}", ty.type_name()),
                }
            }
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    // -------------------------------------------------------------------------
    // Serialization

    pub fn serialize<T: JsonType>(&self, value: &T, settings: &Settings) -> JsonResult<String> {
        self.codec::<T>()?.write(value, settings)
    }

    pub fn deserialize<T: JsonType>(&self, text: &str, settings: &Settings) -> JsonResult<T> {
        let value = self.codec::<T>()?.read(text, settings)?;
        value.downcast::<T>().map(|value| *value).map_err(|_| {
            JsonError::unsupported(type_name::<T>(), "the default constructor built another type")
        })
    }

    /// Serializes a value whose type is only known at runtime.
    pub fn serialize_dyn(
        &self,
        value: &dyn Any,
        ty: TypeRef,
        settings: &Settings,
    ) -> JsonResult<String> {
        self.get_or_build(ty)?.write(value, settings)
    }

    /// Deserializes into a type only known at runtime.
    pub fn deserialize_dyn(
        &self,
        text: &str,
        ty: TypeRef,
        settings: &Settings,
    ) -> JsonResult<BoxedValue> {
        self.get_or_build(ty)?.read(text, settings)
    }

    /// Deserializes into an untyped tree.
    pub fn deserialize_any(&self, text: &str, settings: &Settings) -> JsonResult<JsonValue> {
        self.deserialize::<JsonValue>(text, settings)
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use std::collections::HashMap;
    use std::sync::Barrier;
    use std::thread;

    use super::CodecRegistry;
    use crate::info::TypeRef;
    use crate::settings::Settings;
    use crate::{Json, JsonError};

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Node {
        pub value: i32,
        pub next: Option<Box<Node>>,
    }

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Department {
        pub name: String,
        pub staff: Vec<Employee>,
    }

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Employee {
        pub name: String,
        pub department: Option<Box<Department>>,
    }

    #[derive(Json, Default)]
    struct Hidden {
        pub value: i32,
    }

    #[derive(Json, Default)]
    pub struct Holder {
        pub hidden: Vec<Hidden>,
    }

    #[derive(Json, Default, PartialEq, Eq, Hash)]
    pub struct Key {
        pub id: i32,
    }

    #[derive(Json, Default)]
    pub struct BadMap {
        pub entries: HashMap<Key, i32>,
    }

    #[test]
    fn self_referential_type() {
        let registry = CodecRegistry::new();
        let list = Node {
            value: 1,
            next: Some(Box::new(Node {
                value: 2,
                next: None,
            })),
        };
        let text = registry.serialize(&list, &Settings::default()).unwrap();
        assert_eq!(text, r#"{"value":1,"next":{"value":2,"next":null}}"#);
        let back: Node = registry.deserialize(&text, &Settings::default()).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn mutually_referential_types() {
        let registry = CodecRegistry::new();
        let codec = registry.codec::<Department>().unwrap();
        assert!(registry.contains(TypeRef::of::<Employee>()));
        assert!(registry.contains(TypeRef::of::<Option<Box<Department>>>()));

        // Compiling the other side reuses the published codecs.
        let len = registry.len();
        let employee = registry.codec::<Employee>().unwrap();
        assert_eq!(registry.len(), len);
        assert_ne!(employee.id(), codec.id());
    }

    #[test]
    fn non_public_object_is_rejected() {
        let registry = CodecRegistry::new();
        let err = registry.codec::<Holder>().unwrap_err();
        assert!(matches!(err, JsonError::UnsupportedType { .. }), "{err}");
        // Nothing from the failed session is published.
        assert!(registry.is_empty());
    }

    #[test]
    fn object_keys_are_rejected() {
        let registry = CodecRegistry::new();
        let err = registry.codec::<BadMap>().unwrap_err();
        assert!(matches!(err, JsonError::UnsupportedType { .. }), "{err}");
    }

    #[test]
    fn lookup_by_type_name() {
        let registry = CodecRegistry::new();
        registry.codec::<Node>().unwrap();
        let name = TypeRef::of::<Node>().type_name();
        let codec = registry.get_with_type_name(name).unwrap();
        assert_eq!(codec.type_ref(), TypeRef::of::<Node>());
        assert!(registry.get_with_type_name("no::such::Type").is_none());
    }

    #[test]
    fn concurrent_builds_publish_one_codec() {
        const THREADS: usize = 8;

        let registry = Arc::new(CodecRegistry::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    registry.codec::<Department>().unwrap().id()
                })
            })
            .collect();

        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));

        let len = registry.len();
        let fresh = CodecRegistry::new();
        fresh.codec::<Department>().unwrap();
        assert_eq!(len, fresh.len());
    }

    #[test]
    fn runtime_type_token() {
        let registry = CodecRegistry::new();
        let settings = Settings::default();
        let ty = TypeRef::of::<Vec<u16>>();

        let text = registry.serialize_dyn(&vec![1_u16, 2], ty, &settings).unwrap();
        assert_eq!(text, "[1,2]");

        let value = registry.deserialize_dyn(&text, ty, &settings).unwrap();
        assert_eq!(value.downcast_ref::<Vec<u16>>(), Some(&vec![1, 2]));

        let err = registry.serialize_dyn(&1_i8, ty, &settings).unwrap_err();
        assert!(matches!(err, JsonError::UnsupportedType { .. }));
    }
}
