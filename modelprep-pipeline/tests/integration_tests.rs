//! Integration tests for modelprep-pipeline
//!
//! These tests drive whole batches over an in-memory scene and check the
//! counts, the summaries and the fail-fast behavior together.

use modelprep_core::{
    Error, MemoryScene, Mesh, MeshId, Modifier, Object, ObjectId, ObjectKind, ObjectMode,
    PipelineConfig, Point3, Result, Scene, SymmetryAxis, UvUnwrapParams,
};
use modelprep_ops::{DecimateRequest, DecimationPlanner, UvCandidateSelector};
use modelprep_pipeline::*;

/// A unit right triangle in the XY plane
fn triangle(name: &str) -> Mesh {
    Mesh::from_vertices_and_faces(
        MeshId(0),
        name,
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![vec![0, 1, 2]],
    )
}

fn triangle_with_uv(name: &str) -> Mesh {
    let mut mesh = triangle(name);
    mesh.add_uv_layer("UVMap");
    mesh
}

/// Five mesh objects, the third of which is in edit mode
fn scene_with_editing_third() -> (MemoryScene, Vec<ObjectId>) {
    let mut scene = MemoryScene::new();
    let ids: Vec<ObjectId> = (0..5)
        .map(|i| scene.add_mesh_object(&format!("Mesh.{:03}", i), triangle("tri")))
        .collect();
    scene.object_mut(ids[2]).unwrap().mode = ObjectMode::Edit;
    (scene, ids)
}

fn decimate_count(scene: &MemoryScene, id: ObjectId) -> usize {
    scene.object(id).unwrap().modifiers.decimate_count()
}

/// Records every call instead of unwrapping
#[derive(Default)]
struct RecordingUnwrapper {
    calls: Vec<Vec<ObjectId>>,
    params: Option<UvUnwrapParams>,
    fail: bool,
}

impl UvUnwrapper<MemoryScene> for RecordingUnwrapper {
    fn smart_project(
        &mut self,
        _scene: &mut MemoryScene,
        objects: &[ObjectId],
        params: &UvUnwrapParams,
    ) -> Result<()> {
        self.calls.push(objects.to_vec());
        self.params = Some(*params);
        if self.fail {
            return Err(Error::UnexpectedHostFailure("unwrap operator failed".into()));
        }
        Ok(())
    }
}

#[test]
fn test_weld_scenario() {
    let mut scene = MemoryScene::new();
    let mesh = Mesh::from_vertices_and_faces(
        MeshId(0),
        "Doubles",
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.001),
            Point3::new(5.0, 5.0, 5.0),
        ],
        Vec::new(),
    );
    let id = scene.add_mesh_object("Doubles", mesh);
    let config = PipelineConfig::builder().min_distance(0.005).build().unwrap();

    let result = BatchOrchestrator::new(&mut scene, &config).weld().unwrap();

    assert!(result.is_completed());
    assert_eq!(result.vertices_total, 3);
    assert_eq!(result.vertices_removed, 1);
    assert_eq!(result.to_string(), "Finished 1 meshes: removed 1 of 3 verts");

    let mesh_id = scene.object(id).unwrap().mesh.unwrap();
    assert_eq!(scene.mesh(mesh_id).unwrap().vertex_count(), 2);
}

#[test]
fn test_weld_visits_every_mesh_datablock() {
    let mut scene = MemoryScene::new();
    scene.add_mesh_object("A", triangle("A"));
    // Orphan datablock with no owning object
    scene.add_mesh(triangle("Orphan"));
    scene.add_object(Object::without_mesh(ObjectId(0), "Camera", ObjectKind::Camera));
    let config = PipelineConfig::default();

    let result = BatchOrchestrator::new(&mut scene, &config).weld().unwrap();
    assert_eq!(result.eligible, 2);
    assert_eq!(result.processed, 2);
    assert_eq!(result.vertices_removed, 0);
}

#[test]
fn test_decimate_aborts_on_third_object() {
    let (mut scene, ids) = scene_with_editing_third();
    let config = PipelineConfig::default();

    let mut orchestrator = BatchOrchestrator::new(&mut scene, &config);
    let result = orchestrator.decimate().unwrap();
    assert_eq!(orchestrator.state(), BatchState::Aborted);

    assert!(result.is_aborted());
    assert_eq!(result.processed, 2);
    assert_eq!(result.eligible, 5);
    assert!(matches!(result.error, Some(Error::HostStateConflict(_))));
    assert!(result
        .to_string()
        .starts_with("Decimate aborted after 2 of 5 meshes"));

    // Earlier objects keep their changes, later ones were never touched
    assert_eq!(decimate_count(&scene, ids[0]), 1);
    assert_eq!(decimate_count(&scene, ids[1]), 1);
    assert_eq!(decimate_count(&scene, ids[2]), 0);
    assert_eq!(decimate_count(&scene, ids[3]), 0);
    assert_eq!(decimate_count(&scene, ids[4]), 0);
}

#[test]
fn test_weld_aborts_on_edited_mesh() {
    let (mut scene, ids) = scene_with_editing_third();
    // Give object 4 a weldable double so an untouched mesh is observable
    let late_mesh = scene.object(ids[3]).unwrap().mesh.unwrap();
    scene.meshes[late_mesh.0].add_vertex(Point3::new(0.0, 0.0, 0.0));
    let config = PipelineConfig::default();

    let result = BatchOrchestrator::new(&mut scene, &config).weld().unwrap();
    assert_eq!(result.processed, 2);
    assert_eq!(result.eligible, 5);
    assert!(result.to_string().contains("(are any objects in edit mode?)"));
    assert_eq!(scene.mesh(late_mesh).unwrap().vertex_count(), 4);
}

#[test]
fn test_decimate_is_idempotent_in_cardinality() {
    let mut scene = MemoryScene::new();
    let a = scene.add_mesh_object("A", triangle("A"));
    let b = scene.add_mesh_object("B", triangle("B"));
    scene
        .object_mut(b)
        .unwrap()
        .modifiers
        .push(Modifier::Other {
            name: "Subdivision".into(),
            type_tag: "SUBSURF".into(),
        });
    let config = PipelineConfig::builder().decimate_ratio(0.25).build().unwrap();

    for _ in 0..3 {
        let result = BatchOrchestrator::new(&mut scene, &config).decimate().unwrap();
        assert!(result.is_completed());
        assert_eq!(result.to_string(), "Decimated 2 of 2 meshes");
    }

    assert_eq!(decimate_count(&scene, a), 1);
    assert_eq!(decimate_count(&scene, b), 1);
    // Unrelated modifiers survive
    assert_eq!(scene.object(b).unwrap().modifiers.len(), 2);

    let settings = scene
        .object(a)
        .unwrap()
        .modifiers
        .iter()
        .find_map(Modifier::decimate_settings)
        .copied()
        .unwrap();
    approx::assert_relative_eq!(settings.ratio, 0.25);
}

#[test]
fn test_undecimate_removes_everything() {
    let mut scene = MemoryScene::new();
    let a = scene.add_mesh_object("A", triangle("A"));
    let b = scene.add_mesh_object("B", triangle("B"));
    let config = PipelineConfig::default();

    BatchOrchestrator::new(&mut scene, &config).decimate().unwrap();
    let result = BatchOrchestrator::new(&mut scene, &config).undecimate().unwrap();

    assert!(result.is_completed());
    assert_eq!(result.modifiers_removed, 2);
    assert_eq!(decimate_count(&scene, a), 0);
    assert_eq!(decimate_count(&scene, b), 0);

    // Nothing left to remove is still a successful batch
    let again = BatchOrchestrator::new(&mut scene, &config).undecimate().unwrap();
    assert!(again.is_completed());
    assert_eq!(again.modifiers_removed, 0);
}

#[test]
fn test_symmetry_gating() {
    let mut scene = MemoryScene::new();
    let a = scene.add_mesh_object("A", triangle("A"));

    let off = PipelineConfig::builder()
        .decimate_symmetry(false)
        .decimate_symmetry_axis(SymmetryAxis::Z)
        .build()
        .unwrap();
    BatchOrchestrator::new(&mut scene, &off).decimate().unwrap();
    let settings = *scene
        .object(a)
        .unwrap()
        .modifiers
        .iter()
        .find_map(Modifier::decimate_settings)
        .unwrap();
    assert!(!settings.use_symmetry);
    assert_eq!(settings.symmetry_axis, None);

    let on = PipelineConfig::builder()
        .decimate_symmetry(true)
        .decimate_symmetry_axis(SymmetryAxis::Y)
        .build()
        .unwrap();
    BatchOrchestrator::new(&mut scene, &on).decimate().unwrap();
    let settings = *scene
        .object(a)
        .unwrap()
        .modifiers
        .iter()
        .find_map(Modifier::decimate_settings)
        .unwrap();
    assert!(settings.use_symmetry);
    assert_eq!(settings.symmetry_axis, Some(SymmetryAxis::Y));
}

#[test]
fn test_invalid_parameters_fail_before_mutation() {
    assert!(matches!(
        PipelineConfig::builder().decimate_ratio(1.5).build(),
        Err(Error::InvalidParameter(_))
    ));
    assert!(matches!(
        PipelineConfig::builder().min_distance(-0.1).build(),
        Err(Error::InvalidParameter(_))
    ));

    let planner = DecimationPlanner::new();
    let request = DecimateRequest {
        ratio: 0.5,
        triangulate: false,
        symmetry: true,
        symmetry_axis_index: 3,
    };
    assert!(matches!(
        planner.plan(&request),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_uv_selection_correctness() {
    let mut o1 = triangle("O1");
    let mut o2 = triangle_with_uv("O2");
    let mut o3 = triangle_with_uv("O3");

    let keep = UvCandidateSelector::new(false);
    let delete = UvCandidateSelector::new(true);

    assert!(keep.prepare(&mut o1).needs_unwrap());
    assert!(!keep.prepare(&mut o2).needs_unwrap());
    assert!(delete.prepare(&mut o3).needs_unwrap());

    assert!(o2.has_uv_layers());
    assert!(!o3.has_uv_layers());
}

#[test]
fn test_uv_select_batch() {
    let mut scene = MemoryScene::new();
    let o1 = scene.add_mesh_object("O1", triangle("O1"));
    let o2 = scene.add_mesh_object("O2", triangle_with_uv("O2"));
    let o3 = scene.add_mesh_object("O3", triangle("O3"));

    let keep = PipelineConfig::default();
    let result = BatchOrchestrator::new(&mut scene, &keep)
        .select_uv_candidates()
        .unwrap();
    assert_eq!(result.selected, vec![o1, o3]);
    assert_eq!(result.uv_layers_removed, 0);
    assert_eq!(result.to_string(), "Smart UV Project selected 2 of 3 meshes");

    let delete = PipelineConfig::builder().delete_uv_maps(true).build().unwrap();
    let result = BatchOrchestrator::new(&mut scene, &delete)
        .select_uv_candidates()
        .unwrap();
    assert_eq!(result.selected, vec![o1, o2, o3]);
    assert_eq!(result.uv_layers_removed, 1);

    let mesh = scene.object(o2).unwrap().mesh.unwrap();
    assert!(!scene.mesh(mesh).unwrap().has_uv_layers());
}

#[test]
fn test_smart_uv_project_calls_unwrapper_once() {
    let mut scene = MemoryScene::new();
    let o1 = scene.add_mesh_object("O1", triangle("O1"));
    scene.add_mesh_object("O2", triangle_with_uv("O2"));
    let o3 = scene.add_mesh_object("O3", triangle("O3"));
    let config = PipelineConfig::builder().angle_limit(45.0).build().unwrap();

    let mut unwrapper = RecordingUnwrapper::default();
    let result = BatchOrchestrator::new(&mut scene, &config)
        .smart_uv_project(&mut unwrapper)
        .unwrap();

    assert!(result.is_completed());
    assert_eq!(unwrapper.calls, vec![vec![o1, o3]]);
    approx::assert_relative_eq!(unwrapper.params.unwrap().angle_limit, 45.0);
}

#[test]
fn test_smart_uv_project_skips_empty_selection() {
    let mut scene = MemoryScene::new();
    scene.add_mesh_object("O1", triangle_with_uv("O1"));
    let config = PipelineConfig::default();

    let mut unwrapper = RecordingUnwrapper::default();
    let result = BatchOrchestrator::new(&mut scene, &config)
        .smart_uv_project(&mut unwrapper)
        .unwrap();

    assert!(result.is_completed());
    assert!(result.selected.is_empty());
    assert!(unwrapper.calls.is_empty());
}

#[test]
fn test_smart_uv_project_unwrapper_failure() {
    let mut scene = MemoryScene::new();
    scene.add_mesh_object("O1", triangle_with_uv("O1"));
    let config = PipelineConfig::builder().delete_uv_maps(true).build().unwrap();

    let mut unwrapper = RecordingUnwrapper {
        fail: true,
        ..Default::default()
    };
    let mut orchestrator = BatchOrchestrator::new(&mut scene, &config);
    let result = orchestrator.smart_uv_project(&mut unwrapper).unwrap();

    assert!(result.is_aborted());
    assert_eq!(orchestrator.state(), BatchState::Aborted);
    assert!(matches!(result.error, Some(Error::UnexpectedHostFailure(_))));
    // Layer destruction happened before the unwrap and is not reverted
    assert_eq!(result.uv_layers_removed, 1);
    assert!(!scene.meshes[0].has_uv_layers());
}

#[test]
fn test_scene_json_roundtrip_after_batch() {
    let mut scene = MemoryScene::new();
    scene.add_mesh_object("A", triangle("A"));
    let config = PipelineConfig::default();
    BatchOrchestrator::new(&mut scene, &config).decimate().unwrap();

    let json = serde_json::to_string(&scene).unwrap();
    let back: MemoryScene = serde_json::from_str(&json).unwrap();
    assert_eq!(back, scene);
    assert!(back.validate().is_ok());
}
