// ==========================================
// MaterialInventory 集成测试
// ==========================================
// 测试范围:
// 1. 登记与加法合并
// 2. 消耗: 数量不为负，归零即 USED
// 3. 幂等消耗（requestID 去重）
// 4. 供应快照对账: 幂等、扣除本地累计消耗
// 5. 状态筛选与新/回收分组
// 6. 并发消耗（写闸门串行化）
// 7. 损坏与空 ID 存储行: 查询、筛选、分组均跳过
// ==========================================


#[cfg(test)]
mod inventory_test {
    use battery_ledger::api::{ApiError, RegisterMaterialRequest};
    use battery_ledger::engine::{ConsumeOutcome, EngineError};
    use battery_ledger::{Availability, MaterialOrigin, MaterialStatus, PartitionKind};
    use battery_ledger::repository::{keys, RecordStore};
    use std::sync::Arc;
    use std::thread;

    use crate::test_helpers::{create_test_network, create_test_node, supplier, verifier};

    // ==========================================
    // 登记
    // ==========================================

    #[test]
    fn test_register_同ID加法合并() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");

        node.inventory.register("M1", "SUP-A", "Lithium", 100).unwrap();
        let merged = node.inventory.register("M1", "SUP-A", "Lithium", 25).unwrap();

        assert_eq!(merged.quantity, 125);
        assert_eq!(merged.availability, Availability::Available);
        assert_eq!(node.inventory.query_all().unwrap().len(), 1);
    }

    #[test]
    fn test_register_零数量拒绝() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");

        let err = node.inventory.register("M1", "SUP-A", "Lithium", 0).unwrap_err();
        assert!(matches!(err, EngineError::MalformedInput(_)));
        assert!(node.inventory.query_all().unwrap().is_empty());
    }

    #[test]
    fn test_register_material_无ID时生成() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        let api = network.material_api(PartitionKind::MaterialSupply);

        let record = api
            .register_material(
                &supplier(),
                &RegisterMaterialRequest {
                    material_id: None,
                    supplier_id: "SUP-A".to_string(),
                    name: "Cobalt".to_string(),
                    quantity: 10,
                },
            )
            .unwrap();

        assert!(record.material_id.starts_with("MATERIAL-"));
        assert_eq!(record.origin, MaterialOrigin::New);
    }

    #[test]
    fn test_register_material_非供应商拒绝() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        let api = network.material_api(PartitionKind::MaterialSupply);

        let err = api
            .register_material_json(
                &verifier(),
                r#"{"materialID":"M1","supplierID":"SUP-A","name":"Lithium","quantity":10}"#,
            )
            .unwrap_err();

        assert!(matches!(err, ApiError::PermissionDenied { .. }));
        assert!(api.query_all_materials().unwrap().is_empty());
    }

    // ==========================================
    // 消耗
    // ==========================================

    #[test]
    fn test_consume_数量永不为负() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        node.inventory.register("M1", "SUP-A", "Lithium", 50).unwrap();

        let mut expected = 50u64;
        for amount in [7u64, 13, 60, 20, 11, 1, 5] {
            match node.inventory.consume("M1", amount) {
                Ok(record) => {
                    expected -= amount;
                    assert_eq!(record.quantity, expected);
                }
                Err(EngineError::InsufficientQuantity {
                    material_id,
                    required,
                    available,
                }) => {
                    assert_eq!(material_id, "M1");
                    assert_eq!(required, amount);
                    assert_eq!(available, expected);
                }
                Err(other) => panic!("意外错误: {}", other),
            }

            let record = node.inventory.query("M1").unwrap();
            assert_eq!(record.quantity, expected);
            assert_eq!(record.availability == Availability::Used, expected == 0);
        }
        assert_eq!(expected, 0);
    }

    #[test]
    fn test_consume_不存在的原材料() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");

        let err = node.inventory.consume("NOPE", 1).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_consume_once_重复投递只扣一次() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        let api = network.material_api(PartitionKind::MaterialSupply);
        network
            .node(PartitionKind::MaterialSupply)
            .inventory
            .register("M1", "SUP-A", "Nickel", 30)
            .unwrap();

        let first = api.consume_material_once(&supplier(), "REQ-1", "M1", 10).unwrap();
        let second = api.consume_material_once(&supplier(), "REQ-1", "M1", 10).unwrap();

        assert!(matches!(first, ConsumeOutcome::Applied(ref r) if r.quantity == 20));
        assert!(matches!(second, ConsumeOutcome::AlreadyApplied(ref m) if m.amount == 10));
        assert_eq!(api.query_material("M1").unwrap().quantity, 20);

        let err = api.consume_material_once(&supplier(), "  ", "M1", 1).unwrap_err();
        assert!(matches!(err, ApiError::MalformedInput(_)));
    }

    #[test]
    fn test_consume_并发扣减串行化() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        network
            .node(PartitionKind::MaterialSupply)
            .inventory
            .register("M1", "SUP-A", "Lithium", 100)
            .unwrap();

        let api = Arc::new(network.material_api(PartitionKind::MaterialSupply));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    (0..5)
                        .filter(|_| api.consume_material(&supplier(), "M1", 3).is_ok())
                        .count()
                })
            })
            .collect();

        let succeeded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        let record = api.query_material("M1").unwrap();

        assert_eq!(succeeded, 33);
        assert_eq!(record.quantity, 1);
        assert_eq!(
            network
                .node(PartitionKind::MaterialSupply)
                .inventory
                .usage_of("M1")
                .unwrap()
                .consumed,
            99
        );
    }

    // ==========================================
    // 快照对账
    // ==========================================

    #[test]
    fn test_reconcile_同一快照两次结果一致() {
        let (_temp, supply) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        let (_temp2, local) = create_test_node(PartitionKind::Manufacturing).expect("无法创建测试环境");
        supply.inventory.register("M1", "SUP-A", "Lithium", 100).unwrap();
        supply.inventory.register("M2", "SUP-A", "Cobalt", 40).unwrap();

        let snapshot = supply.inventory.query_all().unwrap();
        local.inventory.reconcile_from_supply_snapshot(snapshot.clone()).unwrap();
        local.inventory.consume("M1", 30).unwrap();

        let first = local.inventory.reconcile_from_supply_snapshot(snapshot.clone()).unwrap();
        let after_first = local.inventory.query("M1").unwrap().quantity;
        let second = local.inventory.reconcile_from_supply_snapshot(snapshot).unwrap();
        let after_second = local.inventory.query("M1").unwrap().quantity;

        assert_eq!(after_first, 70);
        assert_eq!(after_first, after_second);
        assert_eq!(first, second);
        assert_eq!(first.adjusted, vec!["M1".to_string()]);
        assert_eq!(local.inventory.query("M2").unwrap().quantity, 40);
    }

    #[test]
    fn test_reconcile_累计消耗超过快照时饱和为零() {
        let (_temp, local) = create_test_node(PartitionKind::Manufacturing).expect("无法创建测试环境");
        local.inventory.register("M1", "SUP-A", "Lithium", 10).unwrap();
        local.inventory.consume("M1", 10).unwrap();

        let mut stale = local.inventory.query("M1").unwrap();
        stale.quantity = 4;
        local.inventory.reconcile_from_supply_snapshot(vec![stale]).unwrap();

        let record = local.inventory.query("M1").unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(record.availability, Availability::Used);
    }

    #[test]
    fn test_reconcile_空ID记录跳过() {
        let (_temp, local) = create_test_node(PartitionKind::Manufacturing).expect("无法创建测试环境");
        let (_temp2, supply) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        supply.inventory.register("M1", "SUP-A", "Lithium", 10).unwrap();

        let mut snapshot = supply.inventory.query_all().unwrap();
        let mut blank = snapshot[0].clone();
        blank.material_id = "   ".to_string();
        snapshot.push(blank);

        let report = local.inventory.reconcile_from_supply_snapshot(snapshot).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
    }

    // ==========================================
    // 查询
    // ==========================================

    #[test]
    fn test_query_by_status_各口径() {
        let (_dir, network) = create_test_network().expect("无法创建测试环境");
        let node = network.node(PartitionKind::MaterialSupply);
        node.inventory.register("M1", "SUP-A", "Lithium", 10).unwrap();
        node.inventory
            .register_lot("M2", "RECYCLER", "Cobalt", 5, MaterialOrigin::Recycled)
            .unwrap();
        node.inventory.register("M3", "SUP-B", "Nickel", 3).unwrap();
        node.inventory.consume("M3", 3).unwrap();

        let api = network.material_api(PartitionKind::MaterialSupply);
        api.verify_material(&verifier(), "M1").unwrap();

        let ids = |status: &str| -> Vec<String> {
            api.query_by_status(status)
                .unwrap()
                .into_iter()
                .map(|r| r.material_id)
                .collect()
        };
        assert_eq!(ids("new"), vec!["M1", "M3"]);
        assert_eq!(ids("RECYCLED"), vec!["M2"]);
        assert_eq!(ids("verified"), vec!["M1"]);
        assert_eq!(ids("available"), vec!["M1", "M2"]);
        assert_eq!(ids("used"), vec!["M3"]);

        assert!(matches!(api.query_by_status("broken"), Err(ApiError::MalformedInput(_))));
        assert_eq!(
            node.inventory.query_by_status(MaterialStatus::Used).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_catalog_零数量不列出() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        node.inventory.register("M1", "SUP-A", "Lithium", 10).unwrap();
        node.inventory.register("M2", "SUP-A", "Cobalt", 2).unwrap();
        node.inventory
            .register_lot("R1", "RECYCLER", "Lithium", 4, MaterialOrigin::Recycled)
            .unwrap();
        node.inventory.consume("M2", 2).unwrap();

        let catalog = node.inventory.catalog().unwrap();
        assert_eq!(catalog.new_materials.len(), 1);
        assert_eq!(catalog.new_materials[0].material_id, "M1");
        assert_eq!(catalog.recycled_materials.len(), 1);
    }

    #[test]
    fn test_query_损坏与空ID存储行跳过() {
        let (_temp, node) = create_test_node(PartitionKind::MaterialSupply).expect("无法创建测试环境");
        node.inventory.register("M1", "SUP-A", "Lithium", 10).unwrap();
        node.store()
            .put(&keys::material("X"), b"not-json")
            .unwrap();
        let blank = r#"{"materialID":"","supplierID":"SUP-A","name":"Cobalt","quantity":5,"status":"NEW",
            "availability":"AVAILABLE","verified":"NOT VERIFIED","timestamp":"2026-01-01T00:00:00Z"}"#;
        node.store()
            .put(&keys::material("BLANK"), blank.as_bytes())
            .unwrap();

        let all = node.inventory.query_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].material_id, "M1");

        let new_only = node.inventory.query_by_status(MaterialStatus::New).unwrap();
        assert_eq!(new_only.len(), 1);
        assert_eq!(new_only[0].material_id, "M1");

        let catalog = node.inventory.catalog().unwrap();
        assert_eq!(catalog.new_materials.len(), 1);
        assert_eq!(catalog.new_materials[0].material_id, "M1");
        assert!(catalog.recycled_materials.is_empty());
    }
}
