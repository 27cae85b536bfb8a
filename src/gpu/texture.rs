//! Particle sprite textures.

use std::path::Path;

use image::RgbaImage;

use crate::effect::TextureIndex;
use crate::error::FireworksError;

/// Edge length of the generated fallback sprite.
pub const FALLBACK_SPRITE_SIZE: u32 = 64;

/// Decode one sprite image into RGBA8.
///
/// # Errors
///
/// Returns [`FireworksError::LoadFailure`] if the file cannot be opened or
/// decoded.
pub fn decode_sprite(path: &Path) -> Result<RgbaImage, FireworksError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| FireworksError::LoadFailure {
            model: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Soft round sprite: full intensity at the center, zero at the edge.
///
/// The shader reads coverage from the red channel, so every channel carries
/// the same falloff.
pub fn radial_sprite(size: u32) -> RgbaImage {
    let size = size.max(2);
    let center = (size as f32 - 1.0) * 0.5;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = (x as f32 - center) / center;
        let dy = (y as f32 - center) / center;
        let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        let value = (falloff * falloff * 255.0).round() as u8;
        image::Rgba([value, value, value, value])
    })
}

/// Load every sprite in `paths`, substituting [`radial_sprite`] for any
/// that fail. Always yields one image per path.
pub fn load_sprite_images(root: &Path, paths: &[String]) -> Vec<RgbaImage> {
    paths
        .iter()
        .map(|path| {
            decode_sprite(&root.join(path)).unwrap_or_else(|e| {
                log::warn!("{e}; using generated sprite");
                radial_sprite(FALLBACK_SPRITE_SIZE)
            })
        })
        .collect()
}

/// Bind group layout for one sprite: texture at binding 0, sampler at 1.
pub fn sprite_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Sprite Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float {
                        filterable: true,
                    },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(
                    wgpu::SamplerBindingType::Filtering,
                ),
                count: None,
            },
        ],
    })
}

/// The fixed sprite set, one bind group per sprite.
pub struct SpriteTextures {
    // Textures are kept alive alongside the bind groups that view them.
    _textures: Vec<wgpu::Texture>,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl SpriteTextures {
    /// Upload `images` and build their bind groups against `layout`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        images: &[RgbaImage],
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut textures = Vec::with_capacity(images.len());
        let mut bind_groups = Vec::with_capacity(images.len());
        for (i, img) in images.iter().enumerate() {
            let (width, height) = img.dimensions();
            let size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("Sprite {i}")),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                img.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );

            let view =
                texture.create_view(&wgpu::TextureViewDescriptor::default());
            bind_groups.push(device.create_bind_group(
                &wgpu::BindGroupDescriptor {
                    label: Some(&format!("Sprite {i} Bind Group")),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(
                                &view,
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(
                                &sampler,
                            ),
                        },
                    ],
                },
            ));
            textures.push(texture);
        }

        Self {
            _textures: textures,
            bind_groups,
        }
    }

    /// Number of sprites.
    pub fn len(&self) -> usize {
        self.bind_groups.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bind_groups.is_empty()
    }

    /// Bind group for a sprite index, if in range.
    pub fn bind_group(&self, index: TextureIndex) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(index.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radial_sprite_peaks_in_the_middle() {
        let sprite = radial_sprite(FALLBACK_SPRITE_SIZE);
        assert_eq!(sprite.dimensions(), (64, 64));

        let mid = FALLBACK_SPRITE_SIZE / 2;
        let center = sprite.get_pixel(mid, mid)[0];
        let corner = sprite.get_pixel(0, 0)[0];
        assert!(center > 200, "center {center}");
        assert_eq!(corner, 0);
    }

    #[test]
    fn missing_sprites_fall_back() {
        let paths: Vec<String> =
            (1..=8).map(|i| format!("missing/{i}.png")).collect();
        let images = load_sprite_images(Path::new("/nonexistent"), &paths);
        assert_eq!(images.len(), 8);
        assert!(images
            .iter()
            .all(|img| img.dimensions()
                == (FALLBACK_SPRITE_SIZE, FALLBACK_SPRITE_SIZE)));
    }

    #[test]
    fn decode_reports_the_path() {
        let err = decode_sprite(Path::new("/nonexistent/3.png")).unwrap_err();
        assert!(err.to_string().contains("3.png"));
    }
}
