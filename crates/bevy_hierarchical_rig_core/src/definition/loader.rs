use bevy::asset::{AssetLoader, LoadContext, io::Reader};
use bevy::reflect::TypePath;

use super::{RigDefinition, serial::RigDefinitionSerial};
use crate::errors::AssetLoaderError;

#[derive(Default, TypePath)]
pub struct RigDefinitionLoader;

impl AssetLoader for RigDefinitionLoader {
    type Asset = RigDefinition;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let serial: RigDefinitionSerial = ron::de::from_bytes(&bytes)?;
        Ok(RigDefinition::from_serial(serial)?)
    }

    fn extensions(&self) -> &[&str] {
        &["rig.ron"]
    }
}
