use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::{location_description_path, location_image, UNKNOWN_DESCRIPTION};
use crate::error::ResourceError;
use crate::types::{LocationView, Vec2};

#[derive(Clone, Debug)]
pub struct MapLocation {
    pub image_url: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LocationGrid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Vec<MapLocation>>,
}

impl LocationGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (0..width)
            .map(|x| {
                (0..height)
                    .map(|y| MapLocation {
                        image_url: location_image(x, y),
                        description: None,
                    })
                    .collect()
            })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn get(&self, pos: Vec2) -> Option<&MapLocation> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.cells.get(pos.x as usize)?.get(pos.y as usize)
    }

    pub fn set_description(&mut self, pos: Vec2, text: String) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let Some(cell) = self
            .cells
            .get_mut(pos.x as usize)
            .and_then(|column| column.get_mut(pos.y as usize))
        else {
            return false;
        };
        cell.description = Some(text);
        true
    }

    pub fn view(&self, pos: Vec2) -> LocationView {
        let (image_url, description) = match self.get(pos) {
            Some(cell) => (
                cell.image_url.clone(),
                cell.description
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_string()),
            ),
            None => (location_image(pos.x, pos.y), UNKNOWN_DESCRIPTION.to_string()),
        };
        LocationView {
            x: pos.x,
            y: pos.y,
            image_url,
            description,
            coordinates: format!("Location: [{},{}]", pos.x, pos.y),
        }
    }
}

pub fn description_file(root: &Path, pos: Vec2) -> PathBuf {
    root.join(location_description_path(pos.x, pos.y))
}

pub async fn load_description(root: &Path, pos: Vec2) -> Result<String, ResourceError> {
    let path = description_file(root, pos);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(text.trim().to_string()),
        Err(error) => Err(ResourceError::from_io(path, error)),
    }
}

pub async fn load_descriptions(root: &Path, width: i32, height: i32) -> Vec<(Vec2, String)> {
    let mut loaded = Vec::new();
    for x in 0..width {
        for y in 0..height {
            let pos = Vec2 { x, y };
            match load_description(root, pos).await {
                Ok(text) => loaded.push((pos, text)),
                Err(error) => warn!(%error, x, y, "location description unavailable"),
            }
        }
    }
    debug!(
        loaded = loaded.len(),
        total = width * height,
        "location descriptions loaded"
    );
    loaded
}
