//! Color catalogue service

use md_contracts::ColorContract;
use md_core::error::MdError;
use md_core::result::MdResult;
use md_core::types::prefixed_id;
use md_models::{Color, ColorInput};
use md_store::{ColorRepository, DataDir, Record};
use tracing::{info, instrument};

use crate::validate_with;

#[derive(Clone)]
pub struct ColorService {
    colors: ColorRepository,
}

impl ColorService {
    pub fn new(dir: DataDir) -> Self {
        Self {
            colors: ColorRepository::new(dir),
        }
    }

    /// All colors; a missing file is created empty
    pub async fn list(&self) -> MdResult<Vec<Color>> {
        let dir = self.colors.dir();
        if !dir.exists(Color::FILE).await {
            let _gate = dir.lock().await;
            if !dir.exists(Color::FILE).await {
                dir.write(Color::FILE, &Vec::<Color>::new()).await?;
                info!("Initialised empty color catalogue");
            }
        }
        Ok(self.colors.find_all().await?)
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create(&self, input: ColorInput) -> MdResult<Color> {
        validate_with(&ColorContract, &input)?;

        self.colors
            .mutate(|colors| {
                ensure_unique(colors, &input.code, None)?;
                let color = Color {
                    id: prefixed_id("CLR"),
                    name: input.name.trim().to_string(),
                    code: input.code.trim().to_string(),
                };
                colors.push(color.clone());
                Ok::<_, MdError>(color)
            })
            .await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: ColorInput) -> MdResult<Color> {
        validate_with(&ColorContract, &input)?;

        self.colors
            .mutate(|colors| {
                ensure_unique(colors, &input.code, Some(id))?;
                let color = colors
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| MdError::not_found(Color::ENTITY, id))?;
                color.name = input.name.trim().to_string();
                color.code = input.code.trim().to_string();
                Ok::<_, MdError>(color.clone())
            })
            .await
    }

    /// Remove a color. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> MdResult<()> {
        self.colors
            .mutate(|colors| {
                colors.retain(|c| c.id != id);
                Ok::<_, MdError>(())
            })
            .await
    }
}

fn ensure_unique(colors: &[Color], code: &str, except: Option<&str>) -> MdResult<()> {
    let code = code.trim();
    let taken = colors
        .iter()
        .any(|c| c.code == code && Some(c.id.as_str()) != except);
    if taken {
        return Err(MdError::conflict(format!("color code {} already exists", code)));
    }
    Ok(())
}
