// ==========================================
// 端到端全流程测试
// ==========================================
// 测试范围:
// 1. 供应登记 → 制造分区同步并制造 → 余量/状态 → 耗尽即 USED
// 2. 制造 → 在役更新 → 回收判定 → 拆解（跨分区同步）
// 3. 公共分区聚合视图
// ==========================================


#[cfg(test)]
mod e2e_full_flow_test {
    use battery_ledger::api::{ApiError, RegisterMaterialRequest};
    use battery_ledger::domain::{MaintenanceEntry, MaintenanceReading};
    use battery_ledger::partition::SyncSource;
    use battery_ledger::{logging, Availability, BatteryStatus, MaterialOrigin, PartitionKind};

    use crate::test_helpers::{
        analyst, create_test_network, maintainer, manufacturer, operator, recycler, sample_order,
        supplier,
    };

    #[test]
    fn test_e2e_原材料登记消耗至耗尽() {
        logging::init_test();
        let (_dir, network) = create_test_network().expect("无法创建测试环境");

        // ===== 供应分区登记 =====
        let supply = network.material_api(PartitionKind::MaterialSupply);
        supply
            .register_material(
                &supplier(),
                &RegisterMaterialRequest {
                    material_id: Some("LI-001".to_string()),
                    supplier_id: "SUP-A".to_string(),
                    name: "Lithium".to_string(),
                    quantity: 100,
                },
            )
            .unwrap();

        // ===== 制造分区同步并制造 B1 =====
        let manufacturing_sync = network.sync_api(PartitionKind::Manufacturing);
        let supply_source = SyncSource::of(PartitionKind::MaterialSupply);
        manufacturing_sync.sync_materials_from(&supply_source).unwrap();

        network
            .battery_api(PartitionKind::Manufacturing)
            .manufacture(&manufacturer(), &sample_order(&[("LI-001", "Lithium", 40)]))
            .unwrap();

        let materials = network.material_api(PartitionKind::Manufacturing);
        let all = materials.query_all_materials().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, 60);
        assert_eq!(all[0].availability, Availability::Available);

        // 再次同步不会恢复已消耗的数量
        manufacturing_sync.sync_materials_from(&supply_source).unwrap();
        assert_eq!(materials.query_material("LI-001").unwrap().quantity, 60);

        // ===== 消耗剩余 60 =====
        let record = materials.consume_material(&supplier(), "LI-001", 60).unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(record.availability, Availability::Used);

        let err = materials.consume_material(&supplier(), "LI-001", 1).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InsufficientQuantity { required: 1, available: 0, .. }
        ));

        manufacturing_sync.sync_materials_from(&supply_source).unwrap();
        let after = materials.query_material("LI-001").unwrap();
        assert_eq!(after.quantity, 0);
        assert_eq!(after.availability, Availability::Used);

        // 供应分区自身不受下游消耗影响
        assert_eq!(supply.query_material("LI-001").unwrap().quantity, 100);
    }

    #[test]
    fn test_e2e_判定可回收后拆解() {
        logging::init_test();
        let (_dir, network) = create_test_network().expect("无法创建测试环境");

        // ===== 供应 → 制造 =====
        let supply = network.material_api(PartitionKind::MaterialSupply);
        for (id, name, qty) in [("LI-001", "Lithium", 100u64), ("CO-001", "Cobalt", 50)] {
            supply
                .register_material(
                    &supplier(),
                    &RegisterMaterialRequest {
                        material_id: Some(id.to_string()),
                        supplier_id: "SUP-A".to_string(),
                        name: name.to_string(),
                        quantity: qty,
                    },
                )
                .unwrap();
        }
        network
            .sync_api(PartitionKind::Manufacturing)
            .sync_materials_from(&SyncSource::of(PartitionKind::MaterialSupply))
            .unwrap();
        let battery_id = network
            .battery_api(PartitionKind::Manufacturing)
            .manufacture(
                &manufacturer(),
                &sample_order(&[("LI-001", "Lithium", 40), ("CO-001", "Cobalt", 10)]),
            )
            .unwrap()
            .battery_id;

        // ===== 回收分区: 未判定可回收时拆解失败 =====
        let recycle_sync = network.sync_api(PartitionKind::Recycle);
        recycle_sync
            .sync_batteries_from(&SyncSource::of(PartitionKind::Manufacturing))
            .unwrap();
        let recycle = network.recycle_api(PartitionKind::Recycle);
        let requested = recycle.estimate_recoverable(&battery_id).unwrap();
        assert!(matches!(
            recycle.extract(&recycler(), &battery_id, &requested),
            Err(ApiError::NotRecyclable(_))
        ));

        // ===== 在役更新分区: 维保 + 分析 + 回收判定 =====
        network
            .sync_api(PartitionKind::Update)
            .sync_batteries_from(&SyncSource::of(PartitionKind::Manufacturing))
            .unwrap();
        let lifecycle = network.lifecycle_api(PartitionKind::Update);
        lifecycle.request_maintenance(&operator(), &battery_id).unwrap();
        lifecycle
            .add_maintenance_log(
                &maintainer(),
                &battery_id,
                MaintenanceEntry {
                    info: "thermal check".to_string(),
                    maintenance_date: "2026-06-01".to_string(),
                    company: "FixCo".to_string(),
                },
                MaintenanceReading::FixedStep,
            )
            .unwrap();
        lifecycle.request_analysis(&operator(), &battery_id).unwrap();
        lifecycle
            .set_recycle_availability(&analyst(), &battery_id, true)
            .unwrap();

        // ===== 回收分区: 同步后拆解成功 =====
        recycle_sync
            .sync_batteries_from(&SyncSource::of(PartitionKind::Update))
            .unwrap();
        let report = recycle.extract(&recycler(), &battery_id, &requested).unwrap();
        assert_eq!(report.materials["Lithium"].quantity, 12);
        assert_eq!(report.materials["Cobalt"].quantity, 2);

        let battery = network
            .battery_api(PartitionKind::Recycle)
            .query_battery(&battery_id)
            .unwrap();
        assert_eq!(battery.status, BatteryStatus::Disassembled);
        assert_eq!(battery.maintenance_logs.len(), 1);
        assert_eq!(battery.soc, 95.0);

        // ===== 公共分区聚合 =====
        let public_sync = network.sync_api(PartitionKind::Public);
        public_sync
            .sync_batteries_from(&SyncSource::of(PartitionKind::Recycle))
            .unwrap();
        public_sync
            .sync_materials_from(&SyncSource::of(PartitionKind::Recycle))
            .unwrap();

        let public_materials = network.material_api(PartitionKind::Public);
        let recycled = public_materials.query_by_status("RECYCLED").unwrap();
        assert_eq!(recycled.len(), 2);
        assert!(recycled.iter().all(|r| r.origin == MaterialOrigin::Recycled));

        let details = network
            .battery_api(PartitionKind::Public)
            .battery_details(&battery_id)
            .unwrap();
        assert_eq!(details.battery.status, BatteryStatus::Disassembled);
        assert_eq!(details.recycled_ratio["Lithium"], 0.0);
    }
}
