use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::{debug, warn};

use crate::ecs::{
    class::{self, ClassId},
    database::{Config, ObjectDatabase},
    entity::{ComponentTypeId, EntityComponentId, EntityId, EntityState},
    error::{Result, StorageError},
    object::Object,
    storage::{Allocator, SlotId, WeakRef},
};

/// Entities of many classes and the components attached to them.
///
/// Entity ids come from one allocator shared by every entity class. Each entity is stored in
/// the table of its class, and each of its components is stored under the entity's id in the
/// table of the component's class, so an entity has at most one component per class.
///
/// # Invariants
/// - every live entity id has exactly one entity class and a name
/// - `components_of(e)` lists exactly the component classes holding a value under `e`
/// - every component class with a value has a component type id
pub struct EntityComponentDatabase {
    classes: Arc<class::Registry>,
    entity_root: ClassId,
    component_root: ClassId,

    entities: ObjectDatabase,
    components: ObjectDatabase,

    entity_ids: Allocator<EntityId>,
    entity_classes: HashMap<EntityId, ClassId>,
    entity_names: HashMap<EntityId, String>,

    /// Component classes attached to each live entity.
    components_of: HashMap<EntityId, BTreeSet<ClassId>>,

    component_types: HashMap<ClassId, ComponentTypeId>,
    component_type_classes: HashMap<ComponentTypeId, ClassId>,
    component_type_ids: Allocator<ComponentTypeId>,
}

impl EntityComponentDatabase {
    /// Construct an empty database. Entity classes must descend from `entity_root`, component
    /// classes from `component_root`.
    pub fn new(
        classes: Arc<class::Registry>,
        entity_root: ClassId,
        component_root: ClassId,
    ) -> Result<Self> {
        Self::with_config(classes, entity_root, component_root, Config::default())
    }

    pub fn with_config(
        classes: Arc<class::Registry>,
        entity_root: ClassId,
        component_root: ClassId,
        config: Config,
    ) -> Result<Self> {
        classes.get(entity_root)?;
        classes.get(component_root)?;
        Ok(Self {
            entities: ObjectDatabase::with_config(Arc::clone(&classes), config),
            components: ObjectDatabase::with_config(Arc::clone(&classes), config),
            classes,
            entity_root,
            component_root,
            entity_ids: Allocator::new(),
            entity_classes: HashMap::new(),
            entity_names: HashMap::new(),
            components_of: HashMap::new(),
            component_types: HashMap::new(),
            component_type_classes: HashMap::new(),
            component_type_ids: Allocator::new(),
        })
    }

    /// The database holding the entities.
    #[inline]
    pub fn entity_db(&self) -> &ObjectDatabase {
        &self.entities
    }

    /// The database holding the components.
    #[inline]
    pub fn component_db(&self) -> &ObjectDatabase {
        &self.components
    }

    /// Fail unless `class` is `root` or descends from it.
    fn check_class(&self, class: ClassId, root: ClassId) -> Result<Arc<class::Descriptor>> {
        let descriptor = self.classes.get(class)?;
        if !descriptor.is_a(root) {
            let root = self.classes.get(root)?;
            return Err(StorageError::ClassMismatch {
                class: descriptor.name().to_string(),
                expected: root.name().to_string(),
            });
        }
        Ok(descriptor)
    }

    fn check_concrete(&self, class: ClassId, root: ClassId) -> Result<()> {
        let descriptor = self.check_class(class, root)?;
        if descriptor.is_abstract() {
            return Err(StorageError::AbstractClass(descriptor.name().to_string()));
        }
        Ok(())
    }

    fn entity_class_of(&self, id: EntityId) -> Result<ClassId> {
        self.entity_classes
            .get(&id)
            .copied()
            .ok_or(StorageError::InvalidId(id.get()))
    }

    // Entities

    /// Create an entity of `class` under a fresh id.
    pub fn create_entity(&mut self, class: ClassId, name: &str) -> Result<EntityId> {
        self.check_concrete(class, self.entity_root)?;
        let id = self.entity_ids.generate()?;
        if let Err(error) = self.entities.create_at(class, id) {
            self.entity_ids.release(id)?;
            return Err(error);
        }
        self.record_entity(class, id, name);
        Ok(id)
    }

    /// Create an entity of the class storing `T`.
    pub fn create_entity_of<T: 'static>(&mut self, name: &str) -> Result<EntityId> {
        let class = self.classes.of::<T>()?;
        self.create_entity(class, name)
    }

    /// Recreate an entity of `class` under a known id.
    pub fn insert_entity(&mut self, class: ClassId, id: EntityId, name: &str) -> Result<()> {
        self.check_concrete(class, self.entity_root)?;
        self.entity_ids.reserve(id)?;
        if let Err(error) = self.entities.create_at(class, id) {
            self.entity_ids.release(id)?;
            return Err(error);
        }
        self.record_entity(class, id, name);
        Ok(())
    }

    fn record_entity(&mut self, class: ClassId, id: EntityId, name: &str) {
        self.entity_classes.insert(id, class);
        self.entity_names.insert(id, name.to_string());
        self.components_of.insert(id, BTreeSet::new());
    }

    pub fn entity(&self, id: EntityId) -> Result<&dyn Object> {
        let class = self.entity_class_of(id)?;
        self.entities.get(class, id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut dyn Object> {
        let class = self.entity_class_of(id)?;
        self.entities.get_mut(class, id)
    }

    /// Get an entity through its Rust type.
    pub fn entity_of<T: 'static>(&self, id: EntityId) -> Result<&T> {
        self.entities.get_of::<T>(id)
    }

    pub fn entity_mut_of<T: 'static>(&mut self, id: EntityId) -> Result<&mut T> {
        self.entities.get_mut_of::<T>(id)
    }

    /// The class an entity is stored in.
    #[inline]
    pub fn entity_class(&self, id: EntityId) -> Result<ClassId> {
        self.entity_class_of(id)
    }

    pub fn entity_name(&self, id: EntityId) -> Result<&str> {
        self.entity_names
            .get(&id)
            .map(String::as_str)
            .ok_or(StorageError::InvalidId(id.get()))
    }

    /// The first entity of exactly `class`.
    pub fn first_entity(&self, class: ClassId) -> Result<Option<EntityId>> {
        self.check_class(class, self.entity_root)?;
        self.entities.first(class)
    }

    /// Visit every entity whose class is `class` or descends from it.
    pub fn for_each_entity(
        &self,
        class: ClassId,
        mut f: impl FnMut(EntityId, &dyn Object),
    ) -> Result<()> {
        self.check_class(class, self.entity_root)?;
        self.entities
            .for_each_of_hierarchy(class, |_, id, entity| f(id, entity))
    }

    /// Number of entities of exactly `class`.
    pub fn entity_count(&self, class: ClassId) -> Result<usize> {
        self.check_class(class, self.entity_root)?;
        self.entities.count(class)
    }

    /// Number of live entities across every class.
    #[inline]
    pub fn len(&self) -> usize {
        self.entity_classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entity_classes.is_empty()
    }

    #[inline]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entity_classes.contains_key(&id)
    }

    /// Where `id` is in the entity lifecycle.
    pub fn entity_state(&self, id: EntityId) -> EntityState {
        match self.components_of.get(&id) {
            Some(components) if components.is_empty() => EntityState::Created,
            Some(_) => EntityState::Populated,
            None if self.entity_ids.was_issued(id) => EntityState::Destroyed,
            None => EntityState::Unborn,
        }
    }

    /// Remove an entity, finalizing every component it owns first.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<()> {
        let class = self.entity_class_of(id).inspect_err(|error| {
            warn!("cannot remove entity {}: {}", id, error);
        })?;

        let owned: Vec<ClassId> = self
            .components_of
            .get(&id)
            .map(|classes| classes.iter().copied().collect())
            .unwrap_or_default();
        debug!(
            "removing entity {} ({}) with {} component(s)",
            id,
            class,
            owned.len()
        );
        // The record only forgets a class once its component is gone.
        for component_class in owned {
            self.components.remove(component_class, id)?;
            if let Some(classes) = self.components_of.get_mut(&id) {
                classes.remove(&component_class);
            }
        }

        self.entities.remove(class, id)?;
        self.components_of.remove(&id);
        self.entity_classes.remove(&id);
        self.entity_names.remove(&id);
        self.entity_ids.release(id)
    }

    // Components

    /// The type id of `class`, allocating one the first time.
    fn ensure_component_type(&mut self, class: ClassId) -> Result<ComponentTypeId> {
        if let Some(component_type) = self.component_types.get(&class) {
            return Ok(*component_type);
        }
        let component_type = self.component_type_ids.generate()?;
        self.component_types.insert(class, component_type);
        self.component_type_classes.insert(component_type, class);
        debug!("assigned {} to {}", component_type, class);
        Ok(component_type)
    }

    /// Attach a component of `class` to an entity.
    pub fn create_component(
        &mut self,
        class: ClassId,
        entity: EntityId,
    ) -> Result<EntityComponentId> {
        self.check_concrete(class, self.component_root)?;
        self.entity_class_of(entity)?;
        let component_type = self.ensure_component_type(class)?;

        self.components.create_at(class, entity)?;
        self.components_of.entry(entity).or_default().insert(class);
        Ok(EntityComponentId::new(entity, component_type))
    }

    /// Attach a component of the class storing `T` to an entity.
    pub fn create_component_of<T: 'static>(
        &mut self,
        entity: EntityId,
    ) -> Result<EntityComponentId> {
        let class = self.classes.of::<T>()?;
        self.create_component(class, entity)
    }

    pub fn component(&self, class: ClassId, entity: EntityId) -> Result<&dyn Object> {
        self.components.get(class, entity)
    }

    pub fn component_mut(&mut self, class: ClassId, entity: EntityId) -> Result<&mut dyn Object> {
        self.components.get_mut(class, entity)
    }

    /// Get a component through its Rust type.
    pub fn component_of<T: 'static>(&self, entity: EntityId) -> Result<&T> {
        self.components.get_of::<T>(entity)
    }

    pub fn component_mut_of<T: 'static>(&mut self, entity: EntityId) -> Result<&mut T> {
        self.components.get_mut_of::<T>(entity)
    }

    /// Get the component a compact handle refers to.
    pub fn component_by_id(&self, id: EntityComponentId) -> Result<&dyn Object> {
        let component_type = id.component_type();
        let class = self
            .component_type_classes
            .get(&component_type)
            .copied()
            .ok_or(StorageError::InvalidId(component_type.raw()))?;
        self.component(class, id.entity())
    }

    /// The entity owning the first component of exactly `class`.
    pub fn first_component(&self, class: ClassId) -> Result<Option<EntityId>> {
        self.check_class(class, self.component_root)?;
        self.components.first(class)
    }

    /// Visit every component whose class is `class` or descends from it, with its entity.
    pub fn for_each_component(
        &self,
        class: ClassId,
        mut f: impl FnMut(EntityId, &dyn Object),
    ) -> Result<()> {
        self.check_class(class, self.component_root)?;
        self.components
            .for_each_of_hierarchy(class, |_, entity, component| f(entity, component))
    }

    /// Visit every component of the class storing `T`.
    pub fn for_each_component_of<T: 'static>(
        &self,
        f: impl FnMut(EntityId, &T),
    ) -> Result<()> {
        self.components.for_each_of::<T>(f)
    }

    /// The compact type id of a component class that has been instantiated at least once.
    pub fn component_type_id(&self, class: ClassId) -> Result<ComponentTypeId> {
        self.check_class(class, self.component_root)?;
        self.component_types
            .get(&class)
            .copied()
            .ok_or_else(|| StorageError::UnknownClass(class.to_string()))
    }

    /// Component classes attached to an entity, in class id order.
    pub fn component_classes(&self, entity: EntityId) -> Result<Vec<ClassId>> {
        self.components_of
            .get(&entity)
            .map(|classes| classes.iter().copied().collect())
            .ok_or(StorageError::InvalidId(entity.get()))
    }

    pub fn has_component(&self, class: ClassId, entity: EntityId) -> bool {
        self.components_of
            .get(&entity)
            .is_some_and(|classes| classes.contains(&class))
    }

    /// Detach and finalize one component of an entity.
    pub fn remove_component(&mut self, class: ClassId, entity: EntityId) -> Result<()> {
        let Some(owned) = self
            .components_of
            .get_mut(&entity)
            .filter(|owned| owned.contains(&class))
        else {
            warn!("entity {} has no component of {}", entity, class);
            return Err(StorageError::InvalidId(entity.get()));
        };
        owned.remove(&class);
        self.components.remove(class, entity)
    }

    /// Create a weak reference to an entity's `T` component.
    pub fn component_ref<T: 'static>(&self, entity: EntityId) -> Result<WeakRef<T>> {
        self.components.weak_ref::<T>(entity)
    }

    /// Dereference a weak reference to a component.
    pub fn resolve_component<T: 'static>(&self, reference: &WeakRef<T>) -> Result<&T> {
        self.components.resolve(reference)
    }

    /// Remove every entity and component. Component type ids are kept.
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.entity_ids.clear();
        self.entity_classes.clear();
        self.entity_names.clear();
        self.components_of.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::storage::Id;

    #[derive(Debug, Default, PartialEq)]
    struct Actor {
        health: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Camera {
        fov: u32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Transform {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Light {
        intensity: u32,
    }

    struct Fixture {
        db: EntityComponentDatabase,
        entity: ClassId,
        actor: ClassId,
        camera: ClassId,
        component: ClassId,
        transform: ClassId,
        light: ClassId,
    }

    fn fixture() -> Fixture {
        let classes = Arc::new(class::Registry::new());
        let object = classes.register_abstract("Object", None).unwrap();
        let entity = classes.register_abstract("Entity", Some(object)).unwrap();
        let actor = classes.register::<Actor>("Actor", Some(entity)).unwrap();
        let camera = classes.register::<Camera>("Camera", Some(actor)).unwrap();
        let component = classes.register_abstract("Component", Some(object)).unwrap();
        let transform = classes
            .register::<Transform>("Transform", Some(component))
            .unwrap();
        let light = classes.register::<Light>("Light", Some(component)).unwrap();
        let config = Config::default().with_initial_capacity(4);
        Fixture {
            db: EntityComponentDatabase::with_config(classes, entity, component, config).unwrap(),
            entity,
            actor,
            camera,
            component,
            transform,
            light,
        }
    }

    #[test]
    fn entities_share_one_id_space() {
        // Given
        let Fixture {
            mut db,
            actor,
            camera,
            ..
        } = fixture();

        // When
        let player = db.create_entity(actor, "player").unwrap();
        let eye = db.create_entity(camera, "eye").unwrap();

        // Then
        assert_eq!(player, Id::new(1));
        assert_eq!(eye, Id::new(2));
        assert_eq!(db.entity_class(eye), Ok(camera));
        assert_eq!(db.entity_name(player), Ok("player"));
        assert_eq!(db.entity_count(actor), Ok(1));
        assert_eq!(db.len(), 2);
        assert!(db.entity(eye).unwrap().is::<Camera>());
    }

    #[test]
    fn entity_classes_are_checked() {
        // Given
        let Fixture {
            mut db,
            entity,
            transform,
            ..
        } = fixture();

        // Then
        assert!(matches!(
            db.create_entity(transform, "wrong"),
            Err(StorageError::ClassMismatch { .. })
        ));
        assert!(matches!(
            db.create_entity(entity, "abstract"),
            Err(StorageError::AbstractClass(_))
        ));
        assert!(db.is_empty());
        assert_eq!(db.create_entity_of::<Actor>("first").unwrap(), Id::new(1));
    }

    #[test]
    fn hierarchy_iteration_over_entities() {
        // Given
        let Fixture {
            mut db,
            entity,
            actor,
            camera,
            ..
        } = fixture();
        db.create_entity(actor, "a").unwrap();
        db.create_entity(camera, "c").unwrap();
        db.create_entity(actor, "b").unwrap();

        // When
        let mut actors = Vec::new();
        db.for_each_entity(actor, |id, _| actors.push(id)).unwrap();
        let mut all = 0;
        db.for_each_entity(entity, |_, _| all += 1).unwrap();

        // Then
        assert_eq!(actors, vec![Id::new(1), Id::new(3), Id::new(2)]);
        assert_eq!(all, 3);
        assert_eq!(db.first_entity(camera), Ok(Some(Id::new(2))));
    }

    #[test]
    fn insert_entity_replays_known_ids() {
        // Given
        let Fixture { mut db, actor, .. } = fixture();

        // When
        db.insert_entity(actor, Id::new(2), "restored").unwrap();
        let fresh: Vec<_> = (0..2)
            .map(|i| db.create_entity(actor, &format!("fresh{i}")).unwrap())
            .collect();

        // Then
        assert_eq!(fresh, vec![Id::new(1), Id::new(3)]);
        assert_eq!(db.entity_name(Id::new(2)), Ok("restored"));
        assert_eq!(
            db.insert_entity(actor, Id::new(3), "again"),
            Err(StorageError::DuplicateId(3))
        );
    }

    #[test]
    fn entity_lifecycle_states() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            ..
        } = fixture();
        let id = Id::new(1);
        assert_eq!(db.entity_state(id), EntityState::Unborn);

        // When
        db.create_entity(actor, "a").unwrap();

        // Then
        assert_eq!(db.entity_state(id), EntityState::Created);

        // When
        db.create_component(transform, id).unwrap();

        // Then
        assert_eq!(db.entity_state(id), EntityState::Populated);

        // When
        db.remove_entity(id).unwrap();

        // Then
        assert_eq!(db.entity_state(id), EntityState::Destroyed);
        assert!(!db.contains_entity(id));
        assert_eq!(db.remove_entity(id), Err(StorageError::InvalidId(1)));
    }

    #[test]
    fn components_attach_to_entities() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            light,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();

        // When
        let transform_id = db.create_component(transform, id).unwrap();
        let light_id = db.create_component_of::<Light>(id).unwrap();
        db.component_mut_of::<Transform>(id).unwrap().x = 4;

        // Then
        assert_eq!(transform_id.entity(), id);
        assert_eq!(db.component_type_id(transform), Ok(transform_id.component_type()));
        assert_eq!(db.component_type_id(light), Ok(light_id.component_type()));
        assert_ne!(transform_id.component_type(), light_id.component_type());
        assert_eq!(db.component_classes(id), Ok(vec![transform, light]));
        assert!(db.has_component(light, id));
        assert_eq!(
            db.component_by_id(transform_id)
                .unwrap()
                .downcast_ref::<Transform>(),
            Some(&Transform { x: 4, y: 0 })
        );
        assert_eq!(
            db.create_component(transform, id),
            Err(StorageError::DuplicateId(1))
        );
    }

    #[test]
    fn components_need_a_live_entity_and_component_class() {
        // Given
        let Fixture {
            mut db,
            actor,
            component,
            transform,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();

        // Then
        assert_eq!(
            db.create_component(transform, Id::new(9)),
            Err(StorageError::InvalidId(9))
        );
        assert!(matches!(
            db.create_component(actor, id),
            Err(StorageError::ClassMismatch { .. })
        ));
        assert!(matches!(
            db.create_component(component, id),
            Err(StorageError::AbstractClass(_))
        ));
        assert!(matches!(
            db.component_type_id(transform),
            Err(StorageError::UnknownClass(_))
        ));
    }

    #[test]
    fn remove_component_detaches_only_that_class() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            light,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();
        db.create_component(transform, id).unwrap();
        db.create_component(light, id).unwrap();

        // When
        db.remove_component(transform, id).unwrap();

        // Then
        assert!(!db.has_component(transform, id));
        assert!(db.has_component(light, id));
        assert_eq!(db.entity_state(id), EntityState::Populated);
        assert_eq!(
            db.remove_component(transform, id),
            Err(StorageError::InvalidId(1))
        );

        // When
        db.remove_component(light, id).unwrap();

        // Then
        assert_eq!(db.entity_state(id), EntityState::Created);
    }

    #[test]
    fn entity_component_scenario() {
        // Given - three entities, a transform on the first and the last
        let Fixture {
            mut db,
            actor,
            transform,
            component,
            ..
        } = fixture();
        let e0 = db.create_entity(actor, "e0").unwrap();
        let e1 = db.create_entity(actor, "e1").unwrap();
        let e2 = db.create_entity(actor, "e2").unwrap();
        db.create_component(transform, e0).unwrap();
        db.create_component(transform, e2).unwrap();
        db.component_mut_of::<Transform>(e2).unwrap().y = 22;
        let reference = db.component_ref::<Transform>(e2).unwrap();

        // When - e1 owns no transform
        let missing = db.remove_component(transform, e1);

        // Then
        assert_eq!(missing, Err(StorageError::InvalidId(e1.get())));

        // When - removing e0 cascades to its transform, relocating e2's
        db.remove_entity(e0).unwrap();

        // Then
        assert_eq!(db.component_of::<Transform>(e2).unwrap().y, 22);
        assert_eq!(db.resolve_component(&reference).unwrap().y, 22);
        assert!(matches!(
            db.component(transform, e0),
            Err(StorageError::InvalidId(_))
        ));
        let mut visited = Vec::new();
        db.for_each_component(component, |entity, value| {
            visited.push((entity, value.downcast_ref::<Transform>().map(|t| t.y)));
        })
        .unwrap();
        assert_eq!(visited, vec![(e2, Some(22))]);
        let mut typed = Vec::new();
        db.for_each_component_of::<Transform>(|entity, value| typed.push((entity, value.y)))
            .unwrap();
        assert_eq!(typed, vec![(e2, 22)]);
        assert_eq!(db.first_component(transform), Ok(Some(e2)));
    }

    #[test]
    fn recycled_entity_ids_start_without_components() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            ..
        } = fixture();
        let id = db.create_entity(actor, "old").unwrap();
        db.create_component(transform, id).unwrap();
        let reference = db.component_ref::<Transform>(id).unwrap();
        db.remove_entity(id).unwrap();

        // When
        let reused = db.create_entity(actor, "new").unwrap();

        // Then
        assert_eq!(reused, id);
        assert_eq!(db.entity_state(reused), EntityState::Created);
        assert!(!db.has_component(transform, reused));
        assert_eq!(
            db.resolve_component(&reference),
            Err(StorageError::StaleReference)
        );
        db.create_component(transform, reused).unwrap();
    }

    #[test]
    fn clear_forgets_everything() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();
        db.create_component(transform, id).unwrap();

        // When
        db.clear();

        // Then
        assert!(db.is_empty());
        assert_eq!(db.entity_state(id), EntityState::Unborn);
        assert_eq!(db.create_entity(actor, "b").unwrap(), Id::new(1));
        assert_eq!(db.component_db().count(transform), Ok(0));
    }

    #[test]
    fn interrupted_removal_keeps_the_remaining_components_recorded() {
        // Given - the light vanished from its table behind the database's back
        let Fixture {
            mut db,
            actor,
            transform,
            light,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();
        db.create_component(transform, id).unwrap();
        db.create_component(light, id).unwrap();
        db.components.remove(light, id).unwrap();

        // When
        let result = db.remove_entity(id);

        // Then - the transform is gone, the light is still on record
        assert_eq!(result, Err(StorageError::InvalidId(1)));
        assert!(db.contains_entity(id));
        assert!(!db.has_component(transform, id));
        assert_eq!(db.component_classes(id), Ok(vec![light]));
        assert_eq!(db.entity_state(id), EntityState::Populated);
    }

    #[test]
    fn failed_typed_lookups_create_no_tables() {
        // Given
        let Fixture {
            mut db,
            actor,
            transform,
            ..
        } = fixture();
        let id = db.create_entity(actor, "a").unwrap();

        // When
        let entity_lookup = db.entity_mut_of::<Transform>(id).map(|_| ());
        let component_lookup = db.component_mut_of::<Transform>(id).map(|_| ());

        // Then
        assert_eq!(entity_lookup, Err(StorageError::InvalidId(1)));
        assert_eq!(component_lookup, Err(StorageError::InvalidId(1)));
        assert_eq!(db.entity_db().classes(), vec![actor]);
        assert!(!db.component_db().contains_class(transform));
    }
}
