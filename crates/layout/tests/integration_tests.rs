//! Integration tests for moonbase-layout.

use approx::assert_relative_eq;
use moonbase_layout::{
    point_in_ellipse, AutoOptimizer, ClickOutcome, Error, Footprint, Grid, GridPoint, ModuleKind,
    ObjectId, PlacementRequest, PlacementValidator, RestrictionZone, SiteConfig, SiteSession,
    SpatialIndex,
};

fn site(n: u32, cell_size: f64) -> SiteSession {
    SiteSession::new(SiteConfig::new().with_grid_size(n).with_cell_size(cell_size)).unwrap()
}

fn request(w: u32, h: u32, clearance: u32) -> PlacementRequest {
    PlacementRequest::new(ModuleKind::Administrative)
        .with_footprint(w, h)
        .with_clearance(clearance)
}

mod placement_tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_scenario() {
        let mut site = site(10, 10.0);
        let err = site.place(request(2, 2, 0), 9, 9).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { x: 9, y: 9, .. }));
        assert!(site.objects().is_empty());
    }

    #[test]
    fn test_clearance_collision_scenario() {
        let mut site = site(10, 10.0);
        let a = site.place(request(2, 2, 1), 0, 0).unwrap();
        assert_eq!(
            site.place(request(1, 1, 0), 2, 2),
            Err(Error::TooCloseTo(a))
        );
        assert!(site.place(request(1, 1, 0), 3, 3).is_ok());
    }

    #[test]
    fn test_check_placement_does_not_mutate() {
        let mut site = site(10, 10.0);
        site.place(request(2, 2, 0), 0, 0).unwrap();
        let before = site.objects().to_vec();

        assert!(site.check_placement(&request(1, 1, 0), 5, 5).is_ok());
        assert!(site.check_placement(&request(1, 1, 0), 1, 1).is_err());
        assert_eq!(site.objects(), before.as_slice());
    }

    #[test]
    fn test_full_catalog_fits_on_large_grid() {
        let mut site = site(120, 10.0);
        let mut x = 0;
        for kind in ModuleKind::ALL {
            let spec = kind.spec();
            let offset = spec.clearance as i32;
            site.place_module(kind, x + offset, offset).unwrap();
            x += (spec.footprint.width + 2 * spec.clearance) as i32;
        }
        assert_eq!(site.objects().len(), ModuleKind::ALL.len());
    }

    #[test]
    fn test_indexed_validator_matches_session() {
        let mut site = site(30, 10.0);
        site.place_module(ModuleKind::Spaceport, 5, 5).unwrap();
        site.place_module(ModuleKind::Mining, 22, 2).unwrap();
        site.place_module(ModuleKind::Solar, 2, 24).unwrap();

        let index = SpatialIndex::from_objects(site.objects());
        let validator = PlacementValidator::new(*site.grid());
        let footprint = Footprint::new(3, 3);
        for (x, y) in site.grid().cells() {
            assert_eq!(
                validator.can_place(x, y, footprint, 2, site.objects()),
                validator.can_place_indexed(x, y, footprint, 2, &index),
                "mismatch at ({x}, {y})"
            );
        }
    }
}

mod zone_tests {
    use super::*;

    #[test]
    fn test_ellipse_scenario() {
        let grid = Grid::new(20, 10.0).unwrap();
        assert_eq!(grid.center(), GridPoint::new(10.0, 10.0));
        assert!(point_in_ellipse(GridPoint::new(10.0, 10.0), grid.center(), 5.0, 5.0));
        assert!(!point_in_ellipse(GridPoint::new(16.0, 10.0), grid.center(), 5.0, 5.0));
    }

    #[test]
    fn test_polygon_closure_scenario() {
        let mut site = site(20, 10.0);
        site.start_polygon();
        for (x, y) in [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)] {
            let outcome = site.polygon_click(GridPoint::new(x, y)).unwrap();
            assert!(matches!(outcome, ClickOutcome::Added(_)));
        }

        let outcome = site.polygon_click(GridPoint::new(0.5, 0.5)).unwrap();
        match outcome {
            ClickOutcome::Closed(RestrictionZone::Polygon { points }) => {
                assert_eq!(points.len(), 3);
            }
            other => panic!("expected a closed triangle, got {other:?}"),
        }
        assert!(site.zone_enabled());
    }

    #[test]
    fn test_zone_restricts_placement_and_reflow() {
        let mut site = site(30, 10.0);
        let a = site.place(request(3, 3, 1), 0, 0).unwrap();
        let b = site.place(request(2, 2, 1), 27, 27).unwrap();

        site.set_zone(RestrictionZone::ellipse(8.0, 8.0)).unwrap();
        site.enable_zone(true).unwrap();
        assert_eq!(
            site.place(request(2, 2, 0), 0, 20),
            Err(Error::OutsideActiveZone)
        );

        let result = site.auto_optimize();
        assert!(result.all_placed());

        let zone = site.active_zone().unwrap().clone();
        let validator = PlacementValidator::new(*site.grid()).with_zone(Some(&zone));
        for id in [a, b] {
            let obj = site.object(id).unwrap();
            assert!(validator.in_zone(&obj.rect()), "{id} left the zone");
        }
    }

    #[test]
    fn test_reflow_can_ignore_zone() {
        let config = SiteConfig::new()
            .with_grid_size(30)
            .with_reflow_respects_zone(false);
        let mut site = SiteSession::new(config).unwrap();
        let a = site.place(request(2, 2, 0), 14, 14).unwrap();
        site.set_zone(RestrictionZone::ellipse(6.0, 6.0)).unwrap();
        site.enable_zone(true).unwrap();

        site.auto_optimize();
        let obj = site.object(a).unwrap();
        assert_eq!((obj.x, obj.y), (0, 0));
    }

    #[test]
    fn test_ellipse_from_metric_extent() {
        let mut site = site(20, 100.0);
        // 100 m² cells are 10 m wide; 100 m x 60 m gives radii 5 x 3 cells.
        site.set_ellipse_zone(100.0, 60.0).unwrap();
        assert_eq!(site.zone(), Some(&RestrictionZone::ellipse(5.0, 3.0)));
        assert_relative_eq!(
            site.zone_area_m2().unwrap(),
            std::f64::consts::PI * 15.0 * 100.0,
            epsilon = 1e-6
        );
        assert!(site.zone_cells().contains(&(10, 10)));
        assert!(!site.zone_cells().contains(&(10, 14)));
    }
}

mod route_tests {
    use super::*;

    #[test]
    fn test_three_four_five_route() {
        let mut site = site(20, 1.0);
        // 2x2 footprints: centres (1, 1) and (4, 5).
        let a = site.place(request(2, 2, 0), 0, 0).unwrap();
        let b = site.place(request(2, 2, 0), 3, 4).unwrap();
        let id = site.add_route(a, b).unwrap();

        let route = site.route(id).unwrap();
        assert_relative_eq!(route.distance_m, 5.0, epsilon = 1e-12);
        assert_relative_eq!(route.time_min, 5.0 / 80.0, epsilon = 1e-12);
        assert_eq!(site.route_minutes(id).unwrap(), 1);
    }

    #[test]
    fn test_route_to_missing_object() {
        let mut site = site(20, 1.0);
        let a = site.place(request(1, 1, 0), 0, 0).unwrap();
        assert!(matches!(
            site.add_route(a, ObjectId::new(99)),
            Err(Error::NotFound { kind: "object", id: 99 })
        ));
        assert!(site.routes().is_empty());
    }
}

mod optimizer_tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reflow_packs_largest_first() {
        let mut site = site(40, 10.0);
        let small = site.place_module(ModuleKind::Communication, 30, 30).unwrap();
        let port = site.place_module(ModuleKind::Spaceport, 15, 15).unwrap();

        let result = site.auto_optimize();
        assert_eq!(result.objects[0].id, port);
        assert_eq!(result.objects[1].id, small);

        let port = site.object(port).unwrap();
        assert_eq!((port.x, port.y), (0, 0));

        // Spaceport clearance 5 plus communication clearance 1.
        let small = site.object(small).unwrap();
        assert_eq!((small.x, small.y), (16, 0));
    }

    #[test]
    fn test_reflow_keeps_every_id_once() {
        let objects = {
            let mut site = site(25, 10.0);
            for (i, kind) in ModuleKind::ALL.iter().take(6).enumerate() {
                let x = (i as i32 % 3) * 8 + 2;
                let y = (i as i32 / 3) * 10 + 2;
                site.place_module(*kind, x, y).unwrap();
            }
            site.objects().to_vec()
        };

        let grid = Grid::new(25, 10.0).unwrap();
        let result = AutoOptimizer::new().reflow(&objects, &grid, None);
        assert_eq!(result.objects.len(), objects.len());
        let ids: HashSet<_> = result.objects.iter().map(|o| o.id).collect();
        assert_eq!(ids.len(), objects.len());

        let again = AutoOptimizer::new().reflow(&objects, &grid, None);
        assert_eq!(result, again);
    }
}

#[cfg(feature = "serde")]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_project_round_trip() {
        let mut site = site(30, 10.0);
        let a = site.place_module(ModuleKind::Plantation, 2, 2).unwrap();
        let b = site.place_module(ModuleKind::Waste, 15, 15).unwrap();
        site.add_route(a, b).unwrap();
        site.start_measurement(GridPoint::new(1.0, 1.0)).unwrap();
        let m = site.finish_measurement(GridPoint::new(9.0, 4.0)).unwrap();
        site.set_measurement_color(m, "orange").unwrap();

        let json = site.to_json("south-pole").unwrap();
        let loaded = SiteSession::from_json(&json).unwrap();

        assert_eq!(loaded.objects(), site.objects());
        assert_eq!(loaded.routes(), site.routes());
        assert_eq!(loaded.measurement(m).unwrap().color, "orange");
    }
}
