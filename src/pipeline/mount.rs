//! The single attachment point variants draw onto.

use super::VariantKind;
use crate::render::surface::{self, SharedSurface, Surface};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Registration of a variant on the mount's event stream. Dropping it
/// detaches the variant.
#[derive(Debug)]
pub struct Subscription {
    variant: VariantKind,
    live: Arc<AtomicUsize>,
}

impl Subscription {
    fn new(variant: VariantKind, live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::AcqRel);
        Self {
            variant,
            live: Arc::clone(live),
        }
    }

    pub fn variant(&self) -> VariantKind {
        self.variant
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Counts itself in the mount's live-surface gauge while alive.
#[derive(Debug)]
struct SurfaceLease {
    surface: SharedSurface,
    live: Arc<AtomicUsize>,
}

impl Drop for SurfaceLease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug)]
struct Mounted {
    variant: VariantKind,
    // Declaration order is drop order: unsubscribe, then release the surface.
    _subscription: Subscription,
    lease: SurfaceLease,
}

#[derive(Debug, Default)]
pub struct Mount {
    mounted: Option<Mounted>,
    live_surfaces: Arc<AtomicUsize>,
    live_subscriptions: Arc<AtomicUsize>,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys whatever is attached, then attaches a fresh surface for
    /// `variant`.
    pub fn attach(&mut self, variant: VariantKind, width: usize, height: usize) -> SharedSurface {
        self.detach();
        debug_assert_eq!(self.live_surfaces.load(Ordering::Acquire), 0);

        self.live_surfaces.fetch_add(1, Ordering::AcqRel);
        let shared = surface::share(Surface::new(width, height));
        self.mounted = Some(Mounted {
            variant,
            _subscription: Subscription::new(variant, &self.live_subscriptions),
            lease: SurfaceLease {
                surface: Arc::clone(&shared),
                live: Arc::clone(&self.live_surfaces),
            },
        });
        debug!("[pipeline] mounted {variant} surface {width}x{height}");
        shared
    }

    pub fn detach(&mut self) -> Option<VariantKind> {
        let mounted = self.mounted.take()?;
        let variant = mounted.variant;
        drop(mounted);
        debug!("[pipeline] unmounted {variant} surface");
        Some(variant)
    }

    pub fn variant(&self) -> Option<VariantKind> {
        self.mounted.as_ref().map(|m| m.variant)
    }

    pub fn surface(&self) -> Option<SharedSurface> {
        self.mounted.as_ref().map(|m| Arc::clone(&m.lease.surface))
    }

    /// Snapshot of the attached surface.
    pub fn snapshot(&self) -> Option<Surface> {
        self.mounted
            .as_ref()
            .map(|m| surface::lock(&m.lease.surface).clone())
    }

    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces.load(Ordering::Acquire)
    }

    pub fn live_subscriptions(&self) -> usize {
        self.live_subscriptions.load(Ordering::Acquire)
    }

    /// Shared gauge for sampling from other threads.
    pub fn live_surface_gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live_surfaces)
    }
}
