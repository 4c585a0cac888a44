pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod surface;

pub use mesh::{MeshFactory, ObjectShape};
pub use renderer::Renderer;
pub use scene::{HemisphereLight, Material, Node, NodeKey, Scene};
pub use surface::{HeadlessSurface, Surface, SurfaceStats, WindowSurface};
