//! DatasetPlugin loads the city model once at startup.
use bevy::prelude::*;

use super::{search::SearchIndex, store::CityDataset};
use crate::core::MapSettings;

pub struct DatasetPlugin;

impl Plugin for DatasetPlugin {
    fn build(&self, app: &mut App) {
        let path = app
            .world()
            .get_resource::<MapSettings>()
            .map(|settings| settings.dataset_path.clone())
            .unwrap_or_else(|| MapSettings::default().dataset_path);

        let dataset = match CityDataset::load(&path) {
            Ok(dataset) => {
                info!(
                    target: "dataset",
                    "Loaded {} city objects ({} buildings) from {}",
                    dataset.len(),
                    dataset.building_keys().len(),
                    path
                );
                dataset
            }
            Err(err) => {
                warn!(target: "dataset", "{}. Starting with an empty city model.", err);
                CityDataset::default()
            }
        };

        let search = SearchIndex::build(&dataset);
        debug!(target: "dataset", "Search index holds {} buildings and rooms", search.len());
        app.insert_resource(search).insert_resource(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dataset_yields_empty_resource() {
        let mut app = App::new();
        app.insert_resource(MapSettings {
            dataset_path: "does/not/exist.city.json".into(),
            ..MapSettings::default()
        });
        app.add_plugins(DatasetPlugin);

        let dataset = app.world().resource::<CityDataset>();
        assert!(dataset.is_empty());
        assert!(app.world().resource::<SearchIndex>().is_empty());
    }
}
