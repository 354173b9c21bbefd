// crates/pg_framework/tests/component_flow.rs

//! 组件流程集成测试：读取输入、编译模板、借用临时缓冲区、写出倾向项

use ndarray::{ArrayD, IxDyn};
use pg_config::{BackendConfig, DomainConfig};
use pg_foundation::{DType, PgResult, Precision, ScalarType};
use pg_grid::{i, j, k, ComputationalGrid, Dim};
use pg_framework::{
    ComputationalGridComponent, CompileRequest, FieldProperty, FieldReader, MemorySource,
    NativeCompiler, PropertyDict, SourceLayout, StencilKernel, StencilRegistry, TendencyComponent,
};
use pg_storage::{Buffer, TemporaryStoragePool};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 松弛到参考廓线：tnd = (ref - t) / tau
struct Relax {
    tau: f64,
}

impl StencilKernel for Relax {
    fn name(&self) -> &str {
        "relax"
    }

    fn run(&self, args: &mut [&mut Buffer], origin: &[usize], domain: &[usize]) -> PgResult<()> {
        let t = args[0].to_array::<f64>();
        let reference = args[1].to_array::<f64>();
        let mut tnd = args[2].view_mut::<f64>()?;
        for a in origin[0]..origin[0] + domain[0] {
            for b in origin[1]..origin[1] + domain[1] {
                for c in origin[2]..origin[2] + domain[2] {
                    let idx = [a, b, c];
                    tnd[&idx[..]] = (reference[&idx[..]] - t[&idx[..]]) / self.tau;
                }
            }
        }
        Ok(())
    }
}

struct Relaxation {
    base: ComputationalGridComponent,
}

impl TendencyComponent for Relaxation {
    fn base(&self) -> &ComputationalGridComponent {
        &self.base
    }

    fn declared_inputs(&self) -> PropertyDict {
        PropertyDict::from([("f_t".to_string(), FieldProperty::new([i(), j(), k()], "K"))])
    }

    fn declared_tendencies(&self) -> PropertyDict {
        PropertyDict::from([("f_t".to_string(), FieldProperty::new([i(), j(), k()], "K s^-1"))])
    }
}

fn registry() -> StencilRegistry {
    let registry = StencilRegistry::new();
    registry
        .register_stencil(
            "relax",
            Arc::new(|request: &CompileRequest| -> PgResult<Box<dyn StencilKernel>> {
                let tau = request.external("TAU").and_then(Value::as_f64).unwrap_or(1.0);
                Ok(Box::new(Relax { tau }))
            }),
        )
        .unwrap();
    registry
}

#[test]
fn test_relaxation_tendency() {
    let domain = DomainConfig::with_points(3, 4, 5);
    let cg = Arc::new(ComputationalGrid::new(domain).unwrap());
    let config = BackendConfig { precision: Precision::F64, ..Default::default() };
    let component = Relaxation {
        base: ComputationalGridComponent::new(cg.clone(), config.clone()).unwrap(),
    };

    let mut rng = StdRng::seed_from_u64(20220604);
    let column: Vec<f64> = (0..5).map(|_| rng.gen_range(250.0..300.0)).collect();
    let mut source = MemorySource::new();
    source.insert("t", ArrayD::from_shape_vec(IxDyn(&[5]), column.clone()).unwrap());
    source.insert("tau", ArrayD::from_elem(IxDyn(&[1]), 4.0));
    let reader = FieldReader::new(source, cg.clone(), Arc::new(pg_storage::CpuBackend::new()), config);

    let k_dim = Dim::from(k());
    let layout = SourceLayout::new("t", [k_dim], [Dim::Expanded, Dim::Expanded, k_dim]);
    let t = reader.get_field(&[i(), j(), k()], "K", &[], DType::Float, &layout).unwrap();
    let tau = match reader.param("tau", DType::Float, None) {
        pg_framework::ParamValue::Float(v) => v,
        other => panic!("unexpected {:?}", other),
    };

    let kernel = component
        .base()
        .compile_stencil(
            &registry(),
            &NativeCompiler,
            "relax",
            BTreeMap::from([("TAU".to_string(), Value::from(tau))]),
        )
        .unwrap();
    let mut tendency = component.allocate_tendency("f_t").unwrap();
    assert_eq!(tendency.units(), "K s^-1");

    let pool = TemporaryStoragePool::new();
    {
        let mut temps = component.base().temporaries(&pool, &[(&[i(), j(), k()], DType::Float)]).unwrap();
        let reference = &mut temps[0];
        reference.view_mut::<f64>().unwrap().fill(280.0);

        let mut t_buffer = t.buffer().clone();
        let mut out = tendency.buffer().clone();
        let origin = tendency.attrs().origin.clone();
        let shape = tendency.attrs().view_shape.clone();
        kernel
            .run(&mut [&mut t_buffer, reference, &mut out], &origin, &shape)
            .unwrap();
        tendency.replace_buffer(out).unwrap();
    }
    assert_eq!(pool.cached_count(), 1);

    let view = tendency.view::<f64>().unwrap();
    assert_eq!(view.shape(), &[3, 4, 5]);
    for a in 0..3 {
        for b in 0..4 {
            for (c, &tc) in column.iter().enumerate() {
                let expected = (280.0 - tc) / 4.0;
                assert!((view[[a, b, c]] - expected).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn test_single_precision_tendency_allocation() {
    let cg = Arc::new(ComputationalGrid::new(DomainConfig::with_points(2, 2, 3)).unwrap());
    let config = BackendConfig { precision: Precision::F32, ..Default::default() };
    let component = Relaxation {
        base: ComputationalGridComponent::new(cg, config).unwrap(),
    };

    let tendency = component.allocate_tendency("f_t").unwrap();
    assert_eq!(tendency.scalar_type(), ScalarType::F32);
    assert!(component.diagnostic_properties().unwrap().is_empty());
    assert_eq!(component.input_properties().unwrap()["f_t"].dims, vec!["I", "J", "K"]);
}
