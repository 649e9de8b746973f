use geocoin_core::{GameError, KeyValueStore};
use gloo::storage::{LocalStorage, Storage};

/// [`KeyValueStore`] backed by the browser's local storage.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log::error!("Could not read {} from local storage: {:?}", key, err);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> geocoin_core::Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| GameError::Storage(format!("{:?}", err)))
    }

    fn remove(&mut self, key: &str) {
        LocalStorage::delete(key);
    }
}

/// Helper function to ask the player a yes/no question.
pub(crate) fn confirm(message: &str) -> bool {
    gloo::dialogs::confirm(message)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use geocoin_core::{Cell, Coin, StoredInventory};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn local_store_round_trips_typed_values() {
        let mut store = LocalStore;
        let inventory = StoredInventory(vec![Coin::new(Cell::new(3, -2), 0)]);

        store.save(&inventory).unwrap();
        assert_eq!(store.load::<StoredInventory>(), Some(inventory));

        store.forget::<StoredInventory>();
        assert_eq!(store.load::<StoredInventory>(), None);
    }
}
