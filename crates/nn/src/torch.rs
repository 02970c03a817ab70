use std::path::Path;

use noughts_core::{Board, NUM_CELLS};
use tch::{CModule, Device, IValue, Tensor};

use crate::error::{NnError, Result};
use crate::tabular::OUTPUT_LEN;

/// TorchScript policy/value network.
///
/// The module takes `[N, 3, 3, 3]` one-hot planes (mine, theirs, empty)
/// and returns a `(policy[N, 9], value[N])` tuple.
pub struct TorchEvaluator {
    module: CModule,
    device: Device,
}

impl TorchEvaluator {
    pub fn load<P: AsRef<Path>>(path: P, device: Device) -> Result<Self> {
        let module = CModule::load_on_device(path, device)?;
        Ok(Self { module, device })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Output row for `board`: nine priors followed by the value
    pub fn predict(&self, board: &Board) -> Result<Vec<f32>> {
        let planes = board.to_planes();
        let input = Tensor::from_slice(&planes)
            .view([1, 3, 3, 3])
            .to_device(self.device);
        let (policy, value) = self.forward(&input)?;

        let mut out = vec![0f32; OUTPUT_LEN];
        let policy = policy.flatten(0, -1).to_device(Device::Cpu);
        if policy.numel() != NUM_CELLS {
            return Err(NnError::Shape {
                expected: NUM_CELLS,
                actual: policy.numel(),
            });
        }
        policy.copy_data(&mut out[..NUM_CELLS], NUM_CELLS);

        let value = value.flatten(0, -1).to_device(Device::Cpu);
        if value.numel() != 1 {
            return Err(NnError::Shape {
                expected: 1,
                actual: value.numel(),
            });
        }
        value.copy_data(&mut out[NUM_CELLS..], 1);
        Ok(out)
    }

    fn forward(&self, x: &Tensor) -> Result<(Tensor, Tensor)> {
        let input_ivalue = IValue::Tensor(x.shallow_clone());
        let iv = self.module.forward_is(&[input_ivalue])?;

        match iv {
            IValue::Tuple(elems) if elems.len() == 2 => {
                let mut elems = elems.into_iter();
                match (elems.next(), elems.next()) {
                    (Some(IValue::Tensor(policy)), Some(IValue::Tensor(value))) => {
                        Ok((policy, value))
                    }
                    _ => Err(tch::TchError::Kind("Expected a (Tensor, Tensor) tuple".into()).into()),
                }
            }
            _ => Err(tch::TchError::Kind("Expected TorchScript output to be a 2-tuple".into()).into()),
        }
    }
}
