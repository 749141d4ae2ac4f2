//! Rendering cache: a chunk rasterised once into an offscreen image.
//!
//! Caching freezes whatever the chunk drew on its first frame, so it only
//! suits chunks without animated content.

use tracing::{trace, warn};

use crate::grid::GridChunk;
use crate::render::{Engine, ImageOf, RenderContext};

/// A live chunk plus its rendering cache, if one was taken
pub struct CachedChunk<E: Engine, C> {
    pub chunk: C,
    pub cache: Option<ImageOf<E>>,
}

impl<E: Engine, C: GridChunk<E>> CachedChunk<E, C> {
    pub fn new(chunk: C) -> Self {
        Self { chunk, cache: None }
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Blit the cached image at the chunk's position, or let the chunk draw itself
    pub fn draw(&mut self, ctx: &mut E::Context, elapsed_ms: f64) {
        match &self.cache {
            Some(image) => {
                let pos = self.chunk.pos();
                ctx.draw_image(image, pos.x, pos.y);
            }
            None => self.chunk.draw(ctx, elapsed_ms),
        }
    }
}

/// Render the whole chunk into a new offscreen image.
///
/// Off-screen culling is switched off for the duration so every cell is
/// drawn, and the surface is translated so the chunk's top-left corner lands
/// on the image origin. Returns `None` when the engine has no offscreen
/// surface to give; the chunk is left untouched in that case.
pub fn prerender<E, C>(chunk: &mut C, engine: &E) -> Option<ImageOf<E>>
where
    E: Engine,
    C: GridChunk<E>,
{
    let size = chunk.pixel_size();
    let (width, height) = (size.x.ceil() as u32, size.y.ceil() as u32);

    let Some(mut ctx) = engine.create_offscreen(width, height) else {
        warn!(width, height, "No offscreen surface for chunk cache");
        return None;
    };

    let culling = chunk.off_screen_culling();
    chunk.set_off_screen_culling(false);

    let pos = chunk.pos();
    ctx.translate(-pos.x, -pos.y);
    chunk.update(engine, 0.0);
    chunk.draw(&mut ctx, 0.0);

    chunk.set_off_screen_culling(culling);
    trace!(x = pos.x, y = pos.y, width, height, "Pre-rendered chunk");

    Some(ctx.into_image())
}
