//! Assets: objects with ids unique across every asset class.
//!
//! An [`AssetDatabase`] is a facade over an [`ObjectDatabase`]. Tables still store each class
//! contiguously, but ids come from one allocator shared by every asset class, so an id alone
//! names an asset and its class can be looked up.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::ecs::{
    class::{self, ClassId},
    database::{Config, ObjectDatabase},
    error::{Result, StorageError},
    object::Object,
    storage::{Allocator, Id},
};

/// Identifier of an asset, unique across every asset class of a database.
pub type AssetId = Id;

/// Assets of many classes sharing one id space.
pub struct AssetDatabase {
    objects: ObjectDatabase,
    asset_root: ClassId,
    ids: Allocator<AssetId>,
    asset_classes: HashMap<AssetId, ClassId>,
    names: HashMap<AssetId, String>,
}

impl AssetDatabase {
    /// Construct an empty database. Asset classes must descend from `asset_root`.
    pub fn new(classes: Arc<class::Registry>, asset_root: ClassId) -> Result<Self> {
        Self::with_config(classes, asset_root, Config::default())
    }

    pub fn with_config(
        classes: Arc<class::Registry>,
        asset_root: ClassId,
        config: Config,
    ) -> Result<Self> {
        classes.get(asset_root)?;
        Ok(Self {
            objects: ObjectDatabase::with_config(classes, config),
            asset_root,
            ids: Allocator::new(),
            asset_classes: HashMap::new(),
            names: HashMap::new(),
        })
    }

    /// Adopt an existing object database, reserving every id already in it.
    ///
    /// Every class with a table must descend from `asset_root`, and no id may appear in two
    /// classes. Assets are named after their class and id.
    pub fn from_objects(objects: ObjectDatabase, asset_root: ClassId) -> Result<Self> {
        let registry = Arc::clone(objects.registry());
        registry.get(asset_root)?;

        let mut ids = Allocator::new();
        let mut asset_classes = HashMap::new();
        let mut names = HashMap::new();
        for class in objects.classes() {
            let descriptor = Self::asset_class(&registry, class, asset_root)?;
            for id in objects.indexes(class)? {
                ids.reserve(id)?;
                asset_classes.insert(id, class);
                names.insert(id, format!("{}{}", descriptor.name(), id));
            }
        }
        debug!(
            "rebuilt asset id pool from {} existing object(s)",
            asset_classes.len()
        );

        Ok(Self {
            objects,
            asset_root,
            ids,
            asset_classes,
            names,
        })
    }

    /// Give up the facade, keeping the objects.
    pub fn into_objects(self) -> ObjectDatabase {
        self.objects
    }

    /// The underlying object database.
    #[inline]
    pub fn objects(&self) -> &ObjectDatabase {
        &self.objects
    }

    fn asset_class(
        registry: &class::Registry,
        class: ClassId,
        asset_root: ClassId,
    ) -> Result<Arc<class::Descriptor>> {
        let descriptor = registry.get(class)?;
        if !descriptor.is_a(asset_root) {
            return Err(StorageError::ClassMismatch {
                class: descriptor.name().to_string(),
                expected: registry.get(asset_root)?.name().to_string(),
            });
        }
        Ok(descriptor)
    }

    /// Create an asset of `class`.
    pub fn create(&mut self, class: ClassId, name: &str) -> Result<AssetId> {
        let descriptor = Self::asset_class(self.objects.registry(), class, self.asset_root)?;
        if descriptor.is_abstract() {
            return Err(StorageError::AbstractClass(descriptor.name().to_string()));
        }

        let id = self.ids.generate()?;
        if let Err(error) = self.objects.create_at(class, id) {
            self.ids.release(id)?;
            return Err(error);
        }
        self.asset_classes.insert(id, class);
        self.names.insert(id, name.to_string());
        Ok(id)
    }

    /// Create an asset of the class storing `T`.
    pub fn create_of<T: 'static>(&mut self, name: &str) -> Result<AssetId> {
        let class = self.objects.registry().of::<T>()?;
        self.create(class, name)
    }

    pub fn get(&self, id: AssetId) -> Result<&dyn Object> {
        self.objects.get(self.class_of(id)?, id)
    }

    pub fn get_mut(&mut self, id: AssetId) -> Result<&mut dyn Object> {
        let class = self.class_of(id)?;
        self.objects.get_mut(class, id)
    }

    pub fn get_of<T: 'static>(&self, id: AssetId) -> Result<&T> {
        self.objects.get_of::<T>(id)
    }

    pub fn get_mut_of<T: 'static>(&mut self, id: AssetId) -> Result<&mut T> {
        self.objects.get_mut_of::<T>(id)
    }

    /// The class an asset is stored in.
    pub fn class_of(&self, id: AssetId) -> Result<ClassId> {
        self.asset_classes
            .get(&id)
            .copied()
            .ok_or(StorageError::InvalidId(id.get()))
    }

    pub fn name_of(&self, id: AssetId) -> Result<&str> {
        self.names
            .get(&id)
            .map(String::as_str)
            .ok_or(StorageError::InvalidId(id.get()))
    }

    /// Find an asset by name.
    pub fn find(&self, name: &str) -> Option<AssetId> {
        self.names
            .iter()
            .find(|(_, asset_name)| asset_name.as_str() == name)
            .map(|(id, _)| *id)
    }

    #[inline]
    pub fn contains(&self, id: AssetId) -> bool {
        self.asset_classes.contains_key(&id)
    }

    /// Destroy an asset and return its id to the pool.
    pub fn remove(&mut self, id: AssetId) -> Result<()> {
        let class = self.class_of(id)?;
        self.objects.remove(class, id)?;
        self.asset_classes.remove(&id);
        self.names.remove(&id);
        self.ids.release(id)
    }

    /// Visit every asset whose class is `class` or descends from it.
    pub fn for_each(&self, class: ClassId, mut f: impl FnMut(AssetId, &dyn Object)) -> Result<()> {
        Self::asset_class(self.objects.registry(), class, self.asset_root)?;
        self.objects
            .for_each_of_hierarchy(class, |_, id, asset| f(id, asset))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.asset_classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.asset_classes.is_empty()
    }
}
