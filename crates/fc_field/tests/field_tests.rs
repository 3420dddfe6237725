//! crates/fc_field/tests/field_tests.rs
//!
//! 场层集成测试
//!
//! - 字典构造：按补丁名与补丁组查找、未知类型回退与禁止回退
//! - 边界求值：fixedValue、zeroGradient、对称、循环、点场回写
//! - 克隆：补丁场重新绑定到副本的内部场
//! - 场源：NoFieldSource 哨兵、未知类型、尺寸组份额
//! - 网格变化：点移动后实体数不变、拓扑变化时经注册表重排、补丁场逐面数据随面重排

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;

use fc_config::{BlockMeshSpec, BoxSide, DebugSwitches, Dictionary, PatchSpec};
use fc_field::{
    FieldSource, FixedGradientPatchField, GenericPatchField, MixedPatchField, PatchField,
    PatchFieldState, PointScalarField, SourceContext, VolScalarField, VolVectorField,
};
use fc_foundation::dimension_set::{DIM_LENGTH, DIM_PRESSURE, DIM_VELOCITY};
use fc_foundation::{FoamError, PolyTopoChangeMap, DIMLESS};
use fc_mesh::{BlockMesh, Face, MeshRegion, PolyMesh};
use fc_registry::{AsAny, IoObject, RegIoObject, Time};

// ============================================================
// 辅助
// ============================================================

fn patch(name: &str, kind: &str, sides: Vec<BoxSide>) -> PatchSpec {
    PatchSpec {
        name: name.into(),
        patch_type: kind.into(),
        sides,
        groups: vec![],
        neighbour_patch: None,
    }
}

fn channel_spec() -> BlockMeshSpec {
    BlockMeshSpec {
        cells: [4, 2, 2],
        lengths: [2.0, 1.0, 1.0],
        patches: vec![
            patch("inlet", "patch", vec![BoxSide::XMin]),
            patch("outlet", "patch", vec![BoxSide::XMax]),
            patch("walls", "wall", vec![BoxSide::YMin, BoxSide::YMax]),
            patch("top", "patch", vec![BoxSide::ZMax]),
            patch("bottom", "wall", vec![BoxSide::ZMin]),
        ],
        ..Default::default()
    }
}

fn channel() -> PolyMesh {
    BlockMesh::new(channel_spec()).generate("region0").unwrap()
}

fn handle(mesh: PolyMesh) -> Rc<RefCell<PolyMesh>> {
    Rc::new(RefCell::new(mesh))
}

fn dict(name: &str, text: &str) -> Dictionary {
    Dictionary::from_json_str(name, text).unwrap()
}

const P_DICT: &str = r#"{
    "dimensions": [1, -1, -2, 0, 0, 0, 0],
    "internalField": {"uniform": 5.0},
    "boundaryField": {
        "inlet":  {"type": "zeroGradient"},
        "outlet": {"type": "fixedValue", "value": {"uniform": 1.0}},
        "walls":  {"type": "zeroGradient"},
        "top":    {"type": "zeroGradient"},
        "bottom": {"type": "zeroGradient"}
    }
}"#;

/// 单元编号反转：c -> n-1-c，内部面反向
fn reverse_cells(mesh: &mut PolyMesh) -> PolyTopoChangeMap {
    let old = mesh.old_sizes();
    let n = mesh.n_cells();
    let n_internal = mesh.n_internal_faces();
    let mut faces: Vec<Face> = mesh.faces().to_vec();
    let mut owner: Vec<usize> = mesh.owner().iter().map(|c| n - 1 - c).collect();
    let mut neighbour: Vec<usize> = mesh.neighbour().iter().map(|c| n - 1 - c).collect();
    for f in 0..n_internal {
        std::mem::swap(&mut owner[f], &mut neighbour[f]);
        faces[f] = faces[f].reversed();
    }
    let starts = mesh.boundary_mesh().starts();
    let sizes = mesh.boundary_mesh().sizes();
    mesh.reset_primitives(None, faces, owner, neighbour, &starts, &sizes, true)
        .unwrap();

    PolyTopoChangeMap::new(
        old.clone(),
        (0..old.n_points).map(Some).collect(),
        (0..old.n_faces).map(Some).collect(),
        (0..n).map(|c| Some(n - 1 - c)).collect(),
    )
    .unwrap()
    .with_flipped_faces(0..n_internal)
}

/// 指定补丁内的面逆序排列，单元与点不变
fn reverse_patch_faces(mesh: &mut PolyMesh, patches: &[usize]) -> PolyTopoChangeMap {
    let old = mesh.old_sizes();
    let mut face_map: Vec<Option<usize>> = (0..old.n_faces).map(Some).collect();
    for &i in patches {
        let (start, size) = (old.patch_starts[i], old.patch_sizes[i]);
        for f in start..start + size {
            face_map[f] = Some(2 * start + size - 1 - f);
        }
    }
    let faces: Vec<Face> = face_map.iter().flatten().map(|&f| mesh.faces()[f].clone()).collect();
    let owner: Vec<usize> = face_map.iter().flatten().map(|&f| mesh.owner()[f]).collect();
    let neighbour = mesh.neighbour().to_vec();
    mesh.reset_primitives(
        None,
        faces,
        owner,
        neighbour,
        &old.patch_starts,
        &old.patch_sizes,
        true,
    )
    .unwrap();

    PolyTopoChangeMap::new(
        old.clone(),
        (0..old.n_points).map(Some).collect(),
        face_map,
        (0..old.n_cells).map(Some).collect(),
    )
    .unwrap()
}

// ============================================================
// 字典构造
// ============================================================

#[test]
fn test_field_from_dictionary() {
    let mesh = handle(channel());
    let p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh.clone(),
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();

    assert_eq!(p.values().len(), 16);
    assert_eq!(*p.dimensions(), DIM_PRESSURE);
    assert_eq!(
        p.boundary_types(),
        vec!["zeroGradient", "fixedValue", "zeroGradient", "zeroGradient", "zeroGradient"]
    );
    assert_eq!(p.type_name(), "volScalarField");
    assert!(p.sources().is_none());

    let outlet = p.patch_field("outlet").unwrap();
    assert_eq!(outlet.values(), &[1.0; 4]);
    assert!(outlet.fixes_value());
    assert!(p.patch_field("nowhere").is_err());
}

#[test]
fn test_patch_group_lookup() {
    let mut spec = channel_spec();
    spec.patches[2].groups = vec!["noSlip".into()];
    spec.patches[4].groups = vec!["noSlip".into()];
    let mesh = handle(BlockMesh::new(spec).generate("region0").unwrap());

    let d = dict(
        "U",
        r#"{
            "dimensions": [0, 1, -1, 0, 0, 0, 0],
            "internalField": {"uniform": [1, 0, 0]},
            "boundaryField": {
                "inlet":  {"type": "fixedValue", "value": {"uniform": [1, 0, 0]}},
                "outlet": {"type": "zeroGradient"},
                "top":    {"type": "zeroGradient"},
                "noSlip": {"type": "fixedValue", "value": {"uniform": [0, 0, 0]}}
            }
        }"#,
    );
    let u = VolVectorField::from_dictionary(
        IoObject::detached("U"),
        mesh,
        &d,
        &DebugSwitches::default(),
    )
    .unwrap();
    assert_eq!(*u.dimensions(), DIM_VELOCITY);
    assert_eq!(u.patch_field("walls").unwrap().type_name(), "fixedValue");
    assert_eq!(u.patch_field("bottom").unwrap().values()[0], DVec3::ZERO);
}

#[test]
fn test_missing_patch_entry() {
    let mesh = handle(channel());
    let mut d = dict("p", P_DICT);
    let mut boundary = d.sub_dict("boundaryField").unwrap();
    boundary.remove("top");
    d.add_sub_dict("boundaryField", boundary);

    let err = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh,
        &d,
        &DebugSwitches::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("top"), "{err}");
}

#[test]
fn test_unknown_patch_type_falls_back_to_generic() {
    let mesh = handle(channel());
    let mut d = dict("p", P_DICT);
    let mut boundary = d.sub_dict("boundaryField").unwrap();
    boundary.add_sub_dict(
        "outlet",
        dict(
            "outlet",
            r#"{"type": "waveTransmissive", "gamma": 1.4, "value": {"uniform": 2.0}}"#,
        ),
    );
    d.add_sub_dict("boundaryField", boundary);

    let mut p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh.clone(),
        &d,
        &DebugSwitches::default(),
    )
    .unwrap();
    assert_eq!(p.patch_field("outlet").unwrap().type_name(), "waveTransmissive");
    // 占位边界保持读入值
    p.correct_boundary_conditions().unwrap();
    assert_eq!(p.patch_field("outlet").unwrap().values(), &[2.0; 4]);
    // 但不能参与离散
    assert!(p.patch_coeffs(1).is_err());

    let written = p.to_dictionary().unwrap();
    let outlet = written.sub_dict("boundaryField").unwrap().sub_dict("outlet").unwrap();
    assert_eq!(outlet.lookup::<f64>("gamma").unwrap(), 1.4);

    let strict = DebugSwitches {
        disallow_generic_patch_field: true,
        ..Default::default()
    };
    let err = VolScalarField::from_dictionary(IoObject::detached("p"), mesh, &d, &strict)
        .unwrap_err();
    assert!(matches!(err, FoamError::UnknownType { .. }));
    assert!(err.to_string().contains("waveTransmissive"), "{err}");
}

// ============================================================
// 边界求值
// ============================================================

#[test]
fn test_correct_boundary_conditions() {
    let mesh = handle(channel());
    let mut p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh.clone(),
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();
    let cc = mesh.borrow().cell_centres().to_vec();
    for (v, c) in p.internal_mut().values_mut().iter_mut().zip(&cc) {
        *v = c.x;
    }
    p.correct_boundary_conditions().unwrap();

    // zeroGradient 取相邻单元值
    let inlet_cells = mesh.borrow().patch_face_cells(0).to_vec();
    let inlet = p.patch_field("inlet").unwrap();
    for (v, c) in inlet.values().iter().zip(&inlet_cells) {
        assert_eq!(*v, cc[*c].x);
    }
    assert_eq!(inlet.state(), PatchFieldState::Evaluated);

    // fixedValue 不变，法向梯度为 (1 - 1.75) * δ，δ = 1 / 0.25
    assert_eq!(p.patch_field("outlet").unwrap().values(), &[1.0; 4]);
    for g in p.sn_grad(1).unwrap() {
        assert!((g - (1.0 - 1.75) * 4.0).abs() < 1e-12, "g = {g}");
    }

    let coeffs = p.patch_coeffs(1).unwrap();
    assert_eq!(coeffs.value_internal, vec![0.0; 4]);
    assert_eq!(coeffs.value_boundary, vec![1.0; 4]);
    assert!((coeffs.gradient_internal[0] + 4.0).abs() < 1e-12);
}

#[test]
fn test_update_coeffs_state_machine() {
    let mesh = handle(channel());
    let mut p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh,
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();
    assert_eq!(p.boundary_field()[0].state(), PatchFieldState::Constructed);

    p.update_coeffs(0.0).unwrap();
    assert_eq!(p.boundary_field()[0].state(), PatchFieldState::Updated);
    // 重复更新无副作用
    p.update_coeffs(0.0).unwrap();
    assert_eq!(p.boundary_field()[0].state(), PatchFieldState::Updated);

    p.correct_boundary_conditions().unwrap();
    assert!(p
        .boundary_field()
        .iter()
        .all(|pf| pf.state() == PatchFieldState::Evaluated));
}

#[test]
fn test_symmetry_plane_removes_normal_component() {
    let mut spec = channel_spec();
    spec.patches[3] = patch("top", "symmetryPlane", vec![BoxSide::ZMax]);
    let mesh = handle(BlockMesh::new(spec).generate("region0").unwrap());

    let mut u = VolVectorField::new_calculated(
        IoObject::detached("U"),
        mesh,
        DIM_VELOCITY,
        DVec3::new(1.0, 2.0, 3.0),
    )
    .unwrap();
    assert_eq!(u.patch_field("top").unwrap().type_name(), "symmetryPlane");
    assert_eq!(u.patch_field("inlet").unwrap().type_name(), "calculated");

    u.correct_boundary_conditions().unwrap();
    for v in u.patch_field("top").unwrap().values() {
        assert!((*v - DVec3::new(1.0, 2.0, 0.0)).length() < 1e-12, "{v}");
    }
}

#[test]
fn test_cyclic_averages_both_sides() {
    let mut spec = channel_spec();
    spec.patches[0] = PatchSpec {
        neighbour_patch: Some("outlet".into()),
        ..patch("inlet", "cyclic", vec![BoxSide::XMin])
    };
    spec.patches[1] = PatchSpec {
        neighbour_patch: Some("inlet".into()),
        ..patch("outlet", "cyclic", vec![BoxSide::XMax])
    };
    let mesh = handle(BlockMesh::new(spec).generate("region0").unwrap());

    let mut t = VolScalarField::new_calculated(IoObject::detached("T"), mesh.clone(), DIMLESS, 0.0)
        .unwrap();
    assert!(t.patch_field("inlet").unwrap().coupled());

    // x 方向第 i 层单元取值 i
    let cc = mesh.borrow().cell_centres().to_vec();
    for (v, c) in t.internal_mut().values_mut().iter_mut().zip(&cc) {
        *v = (c.x / 0.5).floor();
    }
    t.correct_boundary_conditions().unwrap();
    for v in t.patch_field("inlet").unwrap().values() {
        assert!((v - 1.5).abs() < 1e-12, "v = {v}");
    }
}

#[test]
fn test_point_field_writes_patch_values_back() {
    let mesh = handle(channel());
    let d = dict(
        "pointDisplacement",
        r#"{
            "dimensions": [0, 1, 0, 0, 0, 0, 0],
            "internalField": {"uniform": 0.0},
            "boundaryField": {
                "inlet":  {"type": "calculated", "value": {"uniform": 0.0}},
                "outlet": {"type": "calculated", "value": {"uniform": 0.0}},
                "walls":  {"type": "calculated", "value": {"uniform": 0.0}},
                "top":    {"type": "fixedValue", "value": {"uniform": 0.25}},
                "bottom": {"type": "calculated", "value": {"uniform": 0.0}}
            }
        }"#,
    );
    let mut pd = PointScalarField::from_dictionary(
        IoObject::detached("pointDisplacement"),
        mesh.clone(),
        &d,
        &DebugSwitches::default(),
    )
    .unwrap();
    assert_eq!(*pd.dimensions(), DIM_LENGTH);
    assert_eq!(pd.values().len(), mesh.borrow().n_points());

    pd.correct_boundary_conditions().unwrap();
    let top_points = mesh.borrow().patch_points(3);
    assert!(top_points.iter().all(|p| pd.values()[*p] == 0.25));
}

// ============================================================
// 克隆与运算
// ============================================================

#[test]
fn test_clone_rebinds_patch_fields() {
    let mesh = handle(channel());
    let p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh,
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();
    let p0 = p.clone_named("p_0");

    assert_eq!(p0.name(), "p_0");
    assert_eq!(p0.values(), p.values());
    for (a, b) in p.boundary_field().iter().zip(p0.boundary_field()) {
        assert_eq!(a.patch(), b.patch());
        assert_eq!(a.values(), b.values());
        assert_eq!(a.type_name(), b.type_name());
        assert_ne!(a.internal_field_id(), b.internal_field_id());
        assert_eq!(b.internal_field_id(), p0.io().id());
    }
}

#[test]
fn test_add_assign_ignores_dimensions_by_default() {
    let mesh = handle(channel());
    let mut p = VolScalarField::new_calculated(IoObject::detached("p"), mesh.clone(), DIM_PRESSURE, 1.0)
        .unwrap();
    let q = VolScalarField::new_calculated(IoObject::detached("q"), mesh, DIM_VELOCITY, 2.0)
        .unwrap();
    p += &q;
    assert!(p.values().iter().all(|v| *v == 3.0));
    assert!(p.boundary_field()[0].values().iter().all(|v| *v == 3.0));
    assert_eq!(*p.dimensions(), DIM_PRESSURE);
}

#[test]
#[should_panic(expected = "FOAM FATAL ERROR")]
fn test_add_assign_checks_dimensions_when_enabled() {
    let mesh = handle(channel());
    let mut p = VolScalarField::new_calculated(IoObject::detached("p"), mesh.clone(), DIM_PRESSURE, 1.0)
        .unwrap()
        .with_dimension_check(true);
    let q = VolScalarField::new_calculated(IoObject::detached("q"), mesh, DIM_VELOCITY, 2.0)
        .unwrap();
    p += &q;
}

// ============================================================
// 场源
// ============================================================

#[test]
fn test_sources_sentinel_and_selection() {
    let mesh = handle(channel());
    let p = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh.clone(),
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();
    // 没有 sources 条目时任意名字都得到哨兵
    let src = p.sources().get("anything").unwrap();
    assert_eq!(src.type_name(), "noFieldSource");
    let ctx = SourceContext::new(&[0, 1], p.values(), &[1.0, 1.0], 0.0).unwrap();
    assert_eq!(src.value(&ctx).unwrap(), vec![5.0, 5.0]);

    let mut d = dict("p", P_DICT);
    d.add_sub_dict(
        "sources",
        dict("sources", r#"{"injector": {"type": "bogusType"}}"#),
    );
    let err = VolScalarField::from_dictionary(
        IoObject::detached("p"),
        mesh,
        &d,
        &DebugSwitches::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("bogusType"), "{err}");
}

#[test]
fn test_group_fractions_sum_to_one() {
    let mesh = handle(channel());
    let sizes = [1e-4, 2e-4, 4e-4, 8e-4];
    let mut total = 0.0;
    for i in 0..sizes.len() {
        let text = format!(
            r#"{{
                "dimensions": [0, 0, 0, 0, 0, 0, 0],
                "internalField": {{"uniform": 0.0}},
                "boundaryField": {{
                    "inlet": {{"type": "zeroGradient"}},
                    "outlet": {{"type": "zeroGradient"}},
                    "walls": {{"type": "zeroGradient"}},
                    "top": {{"type": "zeroGradient"}},
                    "bottom": {{"type": "zeroGradient"}}
                }},
                "sources": {{
                    "injector": {{
                        "type": "distributionGroupFraction",
                        "index": {i},
                        "sizes": {sizes:?},
                        "distribution": {{"type": "lognormal", "min": 5e-5, "max": 1e-3, "mu": 2e-4, "sigma": 1e-4}}
                    }}
                }}
            }}"#
        );
        let f = VolScalarField::from_dictionary(
            IoObject::detached(format!("f.{i}")),
            mesh.clone(),
            &dict("f", &text),
            &DebugSwitches::default(),
        )
        .unwrap();
        let src = f.sources().get("injector").unwrap();
        assert_eq!(src.type_name(), "distributionGroupFraction");
        let ctx = SourceContext::new(&[0], f.values(), &[1.0], 0.0).unwrap();
        total += src.source_value(&ctx).unwrap()[0];
    }
    assert!((total - 1.0).abs() < 1e-9, "total = {total}");
}

// ============================================================
// 网格变化
// ============================================================

#[test]
fn test_move_points_keeps_size() {
    let time = Time::new(".", "case");
    let mut region = MeshRegion::new(time.db(), channel());
    let p = VolScalarField::new_calculated(
        region.db().io_object("p", "0"),
        region.mesh().clone(),
        DIM_PRESSURE,
        1.0,
    )
    .unwrap();
    region.db_mut().store(p).unwrap();

    let moved: Vec<DVec3> = region
        .mesh()
        .borrow()
        .points()
        .iter()
        .map(|p| *p * 2.0)
        .collect();
    region.move_points(moved).unwrap();

    let p = region.db().lookup_object::<VolScalarField>("p").unwrap();
    assert_eq!(p.values().len(), region.mesh().borrow().n_cells());
    assert_eq!(p.boundary_field()[0].state(), PatchFieldState::Constructed);
}

#[test]
fn test_topo_change_remaps_registered_fields() {
    let time = Time::new(".", "case");
    let mut region = MeshRegion::new(time.db(), channel());
    let mut p = VolScalarField::from_dictionary(
        region.db().io_object("p", "0"),
        region.mesh().clone(),
        &dict("p", P_DICT),
        &DebugSwitches::default(),
    )
    .unwrap();
    for (i, v) in p.internal_mut().values_mut().iter_mut().enumerate() {
        *v = i as f64;
    }
    region.db_mut().store(p).unwrap();

    let map = reverse_cells(&mut region.mesh().borrow_mut());
    let unhandled = region.topo_change(&map).unwrap();
    assert!(unhandled.is_empty(), "{unhandled:?}");

    let n = region.mesh().borrow().n_cells();
    let p = region.db_mut().lookup_object_mut::<VolScalarField>("p").unwrap();
    for (c, v) in p.values().iter().enumerate() {
        assert_eq!(*v, (n - 1 - c) as f64);
    }
    assert_eq!(p.patch_field("outlet").unwrap().values(), &[1.0; 4]);

    // zeroGradient 按新的 owner 单元重新求值
    p.correct_boundary_conditions().unwrap();
    let mesh = p.mesh().clone();
    let cells = mesh.borrow().patch_face_cells(0).to_vec();
    let inlet = p.patch_field("inlet").unwrap();
    for (v, c) in inlet.values().iter().zip(&cells) {
        assert_eq!(*v, p.values()[*c]);
    }
}

#[test]
fn test_topo_change_maps_patch_face_data() {
    let time = Time::new(".", "case");
    let mut region = MeshRegion::new(time.db(), channel());
    let mut d = dict("p", P_DICT);
    let mut boundary = d.sub_dict("boundaryField").unwrap();
    boundary.add_sub_dict(
        "inlet",
        dict(
            "inlet",
            r#"{"type": "mixed",
                "refValue": {"nonuniform": [1.0, 2.0, 3.0, 4.0]},
                "refGradient": 0.0,
                "valueFraction": {"nonuniform": [0.1, 0.2, 0.3, 0.4]}}"#,
        ),
    );
    boundary.add_sub_dict(
        "outlet",
        dict(
            "outlet",
            r#"{"type": "fixedGradient", "gradient": {"nonuniform": [1.0, 2.0, 3.0, 4.0]}}"#,
        ),
    );
    boundary.add_sub_dict(
        "top",
        dict(
            "top",
            r#"{"type": "totalPressure", "value": 0.0,
                "p0": {"nonuniform": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]}}"#,
        ),
    );
    d.add_sub_dict("boundaryField", boundary);
    let p = VolScalarField::from_dictionary(
        region.db().io_object("p", "0"),
        region.mesh().clone(),
        &d,
        &DebugSwitches::default(),
    )
    .unwrap();
    region.db_mut().store(p).unwrap();

    let map = reverse_patch_faces(&mut region.mesh().borrow_mut(), &[0, 1, 3]);
    let unhandled = region.topo_change(&map).unwrap();
    assert!(unhandled.is_empty(), "{unhandled:?}");

    let p = region.db_mut().lookup_object_mut::<VolScalarField>("p").unwrap();
    let outlet = p.patch_field("outlet").unwrap();
    let outlet = outlet
        .as_any()
        .downcast_ref::<FixedGradientPatchField<f64>>()
        .unwrap();
    assert_eq!(outlet.gradient(), &[4.0, 3.0, 2.0, 1.0]);

    let inlet = p.patch_field("inlet").unwrap();
    let inlet = inlet.as_any().downcast_ref::<MixedPatchField<f64>>().unwrap();
    assert_eq!(inlet.ref_value(), &[4.0, 3.0, 2.0, 1.0]);
    assert_eq!(inlet.ref_grad(), &[0.0; 4]);
    assert_eq!(inlet.value_fraction(), &[0.4, 0.3, 0.2, 0.1]);

    let top = p.patch_field("top").unwrap();
    let top = top.as_any().downcast_ref::<GenericPatchField<f64>>().unwrap();
    assert_eq!(
        top.dict().lookup::<fc_field::FieldEntry<f64>>("p0").unwrap(),
        fc_field::FieldEntry::Nonuniform {
            nonuniform: vec![8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]
        }
    );

    // 重排后的梯度可直接求值
    p.correct_boundary_conditions().unwrap();
}
