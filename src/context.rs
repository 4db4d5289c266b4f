//! The `Context` holds the per-run services a sweep needs besides the population itself: the
//! seeded random number generators and any other module-specific data. Modules register their
//! data with [`define_data_plugin!`] and fetch it through `get_data_container[_mut]`.

use std::any::{Any, TypeId};

use crate::hashing::HashMap;
use crate::population::Timestep;

pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        struct $plugin {}

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

pub struct Context {
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_timestep: Timestep,
}

impl Context {
    pub fn new() -> Context {
        Context {
            data_plugins: HashMap::default(),
            current_timestep: 0,
        }
    }

    fn add_plugin<T: DataPlugin>(&mut self) {
        self.data_plugins
            .insert(TypeId::of::<T>(), Box::new(T::create_data_container()));
    }

    /// Returns the data container for `T`, creating it if it does not exist yet.
    #[allow(clippy::missing_panics_doc)]
    pub fn get_data_container_mut<T: DataPlugin>(&mut self) -> &mut T::DataContainer {
        let type_id = TypeId::of::<T>();
        if !self.data_plugins.contains_key(&type_id) {
            self.add_plugin::<T>();
        }
        self.data_plugins
            .get_mut(&type_id)
            .unwrap()
            .downcast_mut::<T::DataContainer>()
            // The container was created by `T::create_data_container`
            .unwrap()
    }

    /// Returns the data container for `T` if one has been created.
    pub fn get_data_container<T: DataPlugin>(&self) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|data| data.downcast_ref::<T::DataContainer>())
    }

    /// The timestep the simulation driver is currently executing. Zero before the loop starts.
    pub fn get_current_timestep(&self) -> Timestep {
        self.current_timestep
    }

    pub(crate) fn set_current_timestep(&mut self, timestep: Timestep) {
        self.current_timestep = timestep;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
