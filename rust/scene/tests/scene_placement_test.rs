// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full runs over in-memory sessions: plan against the scene, apply through
//! the scene writer, inspect the resulting documents.

use approx::assert_relative_eq;
use sleeve_placement::{
    BarrierRef, ElementId, Error as PlacementError, LevelId, MepKind, PlacementConfig,
    PlacementReport, Placer, TemplateId, ViewId,
};
use sleeve_scene::{
    Document, Level, LinkInstance, LinkPlacement, LinkedModel, MepCurve, OpeningTemplate,
    PathSnapshot, SceneWriter, Session, View3d, Wall,
};

fn level(id: u64, elevation: f64) -> Level {
    Level {
        id: LevelId(id),
        name: format!("Level {id}"),
        elevation,
    }
}

/// A wall along +y crossing the x axis at `x`.
fn wall(id: u64, x: f64, level: u64, layers: Vec<f64>) -> Wall {
    Wall {
        id: ElementId(id),
        name: "Basic Wall".into(),
        level: Some(LevelId(level)),
        start: [x, -5.0, 0.0],
        end: [x, 5.0, 0.0],
        height: 3.0,
        thickness: 0.2,
        layers,
    }
}

fn line(id: u64, start: [f64; 3], end: [f64; 3], diameter: f64) -> MepCurve {
    MepCurve {
        id: ElementId(id),
        path: PathSnapshot::Line { start, end },
        diameter: Some(diameter),
    }
}

fn host(walls: Vec<Wall>) -> Document {
    let mut doc = Document::new("Tower_AR");
    doc.levels = vec![level(1, 0.0), level(2, 3.5)];
    doc.walls = walls;
    doc.views = vec![
        View3d {
            id: ViewId(90),
            name: "3D template".into(),
            is_template: true,
            hidden: Vec::new(),
        },
        View3d {
            id: ViewId(100),
            name: "{3D}".into(),
            is_template: false,
            hidden: Vec::new(),
        },
    ];
    doc.templates = vec![OpeningTemplate {
        id: TemplateId(200),
        family: "Opening".into(),
        name: "Round".into(),
        parameters: vec!["Width".into(), "Height".into()],
        active: true,
    }];
    doc
}

fn systems(ducts: Vec<MepCurve>, pipes: Vec<MepCurve>) -> Document {
    let mut doc = Document::new("Tower_Systems");
    doc.ducts = ducts;
    doc.pipes = pipes;
    doc
}

fn run(session: &mut Session) -> PlacementReport {
    try_run(session).unwrap()
}

fn try_run(session: &mut Session) -> Result<PlacementReport, PlacementError> {
    let config = PlacementConfig::default();
    let plan = {
        let host = session.host().unwrap();
        let systems = session.systems(&config.systems_title_pattern).unwrap();
        Placer::new(&config).plan(&host, systems)?
    };
    let mut writer = SceneWriter::new(session.host_document_mut().unwrap());
    plan.apply(&mut writer)
}

#[test]
fn duct_through_wall_gets_one_sized_opening() {
    let mut session = Session::new(vec![
        host(vec![wall(77, 4.0, 1, Vec::new())]),
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let report = run(&mut session);
    assert_eq!(report.opening_count(), 1);
    assert_eq!(report.ducts.raw_hits, 2);
    assert_eq!(report.ducts.crossings, 1);

    let openings = &session.host_document().unwrap().openings;
    assert_eq!(openings.len(), 1);
    let opening = &openings[0];
    assert_eq!(opening.host, BarrierRef::host(ElementId(77)));
    assert_eq!(opening.level, LevelId(1));
    // anchored on the near face of the 0.2 m wall
    assert_relative_eq!(opening.point[0], 3.9, epsilon = 1e-9);
    assert_relative_eq!(opening.point[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(opening.point[2], 1.0, epsilon = 1e-9);
    assert_eq!(opening.parameters["Width"], 0.3);
    assert_eq!(opening.parameters["Height"], 0.3);
}

#[test]
fn layered_wall_gets_one_opening() {
    let mut session = Session::new(vec![
        host(vec![wall(77, 4.0, 1, vec![0.02, 0.16, 0.02])]),
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let report = run(&mut session);
    assert_eq!(report.ducts.raw_hits, 4);
    assert_eq!(report.opening_count(), 1);
    assert_relative_eq!(report.openings[0].point[0], 3.9, epsilon = 1e-9);
}

#[test]
fn wall_face_on_grid_line_anchors_on_near_face() {
    // the 4 m wall indexes with 0.25 m cells, putting the near face on a grid line
    let mut short = wall(77, 4.1, 1, Vec::new());
    short.start = [4.1, -2.0, 0.0];
    short.end = [4.1, 2.0, 0.0];
    let mut session = Session::new(vec![
        host(vec![short]),
        systems(
            vec![
                line(500, [-6.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3),
                line(501, [-6.0, 0.0, 1.0], [4.1, 0.0, 1.0], 0.3),
            ],
            Vec::new(),
        ),
    ]);

    let report = run(&mut session);
    assert_eq!(report.opening_count(), 2);
    for opening in &report.openings {
        assert_eq!(opening.barrier, BarrierRef::host(ElementId(77)));
        assert_relative_eq!(opening.point[0], 4.0, epsilon = 1e-9);
    }
}

#[test]
fn wall_past_segment_end_gets_nothing() {
    let mut session = Session::new(vec![
        host(vec![wall(77, 12.0, 1, Vec::new())]),
        systems(Vec::new(), vec![line(600, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.05)]),
    ]);

    let report = run(&mut session);
    assert_eq!(report.pipes.raw_hits, 2);
    assert_eq!(report.pipes.hits_in_range, 0);
    assert_eq!(report.opening_count(), 0);
}

#[test]
fn linked_and_host_walls_with_same_id_both_get_openings() {
    let mut doc = host(vec![wall(77, 4.0, 1, Vec::new())]);
    doc.links = vec![LinkInstance {
        id: ElementId(3),
        name: "Structure".into(),
        placement: LinkPlacement {
            translation: [4.0, 0.0, 0.0],
            rotation_z: 0.0,
        },
        model: LinkedModel {
            title: "Tower_ST".into(),
            levels: vec![level(10, 0.0)],
            walls: vec![wall(77, 2.0, 10, Vec::new())],
        },
    }];
    let mut session = Session::new(vec![
        doc,
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let report = run(&mut session);
    assert_eq!(report.opening_count(), 2);

    let hosts: Vec<_> = report.openings.iter().map(|o| o.barrier).collect();
    assert_eq!(
        hosts,
        vec![
            BarrierRef::host(ElementId(77)),
            BarrierRef::linked(ElementId(3), ElementId(77)),
        ]
    );
    assert_relative_eq!(report.openings[1].point[0], 5.9, epsilon = 1e-9);
    assert_eq!(report.openings[1].level, LevelId(1));
}

#[test]
fn hidden_wall_is_not_crossed() {
    let mut doc = host(vec![
        wall(77, 4.0, 1, Vec::new()),
        wall(78, 6.0, 1, Vec::new()),
    ]);
    doc.views[1].hidden = vec![ElementId(77)];
    let mut session = Session::new(vec![
        doc,
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let report = run(&mut session);
    assert_eq!(report.opening_count(), 1);
    assert_eq!(report.openings[0].barrier, BarrierRef::host(ElementId(78)));
}

#[test]
fn ducts_and_pipes_are_processed_independently() {
    let mut session = Session::new(vec![
        host(vec![wall(77, 4.0, 1, Vec::new())]),
        systems(
            vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)],
            vec![line(600, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.05)],
        ),
    ]);

    let report = run(&mut session);
    assert_eq!(report.opening_count(), 2);
    assert_eq!(report.openings_for(MepKind::Duct).count(), 1);
    assert_eq!(report.openings_for(MepKind::Pipe).count(), 1);
    let pipe = report.openings_for(MepKind::Pipe).next().unwrap();
    assert_eq!(pipe.width, 0.05);
}

#[test]
fn template_only_views_abort_without_changes() {
    let mut doc = host(vec![wall(77, 4.0, 1, Vec::new())]);
    doc.views.retain(|v| v.is_template);
    let mut session = Session::new(vec![
        doc,
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let err = try_run(&mut session).unwrap_err();
    assert!(matches!(err, PlacementError::No3dView));
    assert!(session.host_document().unwrap().openings.is_empty());
}

#[test]
fn inactive_template_is_activated_and_saved() {
    let mut doc = host(vec![wall(77, 4.0, 1, Vec::new())]);
    doc.templates[0].active = false;
    let mut session = Session::new(vec![
        doc,
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    run(&mut session);

    let reloaded = Session::from_json(&session.to_json().unwrap()).unwrap();
    let host = reloaded.host_document().unwrap();
    assert!(host.templates[0].active);
    assert_eq!(host.openings.len(), 1);
    assert_eq!(host.openings[0].template, TemplateId(200));
}

#[test]
fn report_serializes_counts_and_diagnostics() {
    let mut session = Session::new(vec![
        host(vec![wall(77, 4.0, 1, Vec::new())]),
        systems(vec![line(500, [0.0, 0.0, 1.0], [10.0, 0.0, 1.0], 0.3)], Vec::new()),
    ]);

    let report = run(&mut session);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["ducts"]["openings"], 1);
    assert_eq!(json["diagnostics"][0]["code"], "EMPTY_STREAM");
    assert_eq!(json["diagnostics"][0]["stream"], "pipe");
}
