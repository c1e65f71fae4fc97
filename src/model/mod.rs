// MODEL: camera, meshes and the diorama
pub mod camera;
pub mod mesh;
pub mod scene;

pub use camera::Camera;
pub use mesh::{parse_obj, MeshData, ObjError};
pub use scene::{Scene, SceneObject};
