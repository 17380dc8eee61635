use coolant_supervisor::hardware::plc::{
    InputRegister, OutputRegister, RegisterBus, RegisterValue, FAN_PWM_OUTPUT, IGNITION_INPUT,
    LEVEL_INPUT, PUMP_ENABLE_OUTPUT, PUMP_PWM_OUTPUT, SUPPLY_VOLTAGE_INPUT, TEMPERATURE_INPUT,
};
use coolant_supervisor::hardware::NullRegisterBus;
use coolant_supervisor::*;
use std::collections::HashMap;

/// PLC driver double: inputs come from a snapshot, writes land in a
/// register map.
#[derive(Default)]
struct ScriptedBus {
    inputs: SensorSnapshot,
    registers: HashMap<u8, RegisterValue>,
    offline: bool,
}

impl RegisterBus for ScriptedBus {
    fn read_bool(&mut self, register: InputRegister) -> Result<bool, HardwareError> {
        if self.offline {
            return Err(HardwareError::RegisterRead(register.index()));
        }
        Ok(match register {
            IGNITION_INPUT => self.inputs.ignition_closed,
            LEVEL_INPUT => self.inputs.level_switch_closed,
            _ => false,
        })
    }

    fn read_float(&mut self, register: InputRegister) -> Result<f32, HardwareError> {
        if self.offline {
            return Err(HardwareError::RegisterRead(register.index()));
        }
        Ok(match register {
            TEMPERATURE_INPUT => self.inputs.temperature,
            SUPPLY_VOLTAGE_INPUT => self.inputs.supply_voltage,
            _ => 0.0,
        })
    }

    fn write(&mut self, register: OutputRegister, value: RegisterValue) -> Result<(), HardwareError> {
        self.registers.insert(register.index(), value);
        Ok(())
    }
}

fn register(sup: &Supervisor<PlcHardware<ScriptedBus>, FixedOutputController>, reg: OutputRegister) -> Option<RegisterValue> {
    sup.hardware().bus().registers.get(&reg.index()).copied()
}

fn create_supervisor(bus: ScriptedBus) -> Supervisor<PlcHardware<ScriptedBus>, FixedOutputController> {
    let params = Parameters::new(20.0, 25.0).unwrap();
    let mut supervisor = Supervisor::new(params, PlcHardware::new(bus), FixedOutputController::new(70, 60));
    supervisor.initialize().unwrap();
    supervisor
}

#[test]
fn test_full_cycle_through_registers() {
    let mut supervisor = create_supervisor(ScriptedBus::default());
    assert_eq!(supervisor.step(), SupervisorState::Idle);
    // Boot leaves the output registers alone
    assert!(supervisor.hardware().bus().registers.is_empty());

    assert_eq!(supervisor.step(), SupervisorState::Idle);
    assert_eq!(register(&supervisor, PUMP_ENABLE_OUTPUT), Some(RegisterValue::Switch(false)));

    supervisor.hardware_mut().bus_mut().inputs = SensorSnapshot {
        supply_voltage: 24.0,
        ignition_closed: true,
        level_switch_closed: true,
        temperature: 35.0,
    };
    assert_eq!(supervisor.step(), SupervisorState::Ignition);
    assert_eq!(supervisor.step(), SupervisorState::Active);
    assert_eq!(register(&supervisor, PUMP_PWM_OUTPUT), Some(RegisterValue::Duty(20)));
    assert_eq!(register(&supervisor, FAN_PWM_OUTPUT), Some(RegisterValue::Duty(20)));

    assert_eq!(supervisor.step(), SupervisorState::Active);
    assert_eq!(register(&supervisor, PUMP_PWM_OUTPUT), Some(RegisterValue::Duty(60)));
    assert_eq!(register(&supervisor, FAN_PWM_OUTPUT), Some(RegisterValue::Duty(70)));
    assert_eq!(register(&supervisor, PUMP_ENABLE_OUTPUT), Some(RegisterValue::Switch(true)));
}

#[test]
fn test_lost_inputs_trip_interlocks() {
    let mut supervisor = create_supervisor(ScriptedBus {
        inputs: SensorSnapshot {
            supply_voltage: 24.0,
            ignition_closed: true,
            level_switch_closed: true,
            temperature: 35.0,
        },
        ..ScriptedBus::default()
    });
    supervisor.step();
    supervisor.step();
    assert_eq!(supervisor.step(), SupervisorState::Active);

    // Driver stops answering mid-run
    supervisor.hardware_mut().bus_mut().offline = true;
    assert_eq!(supervisor.step(), SupervisorState::Idle);
    assert!(matches!(supervisor.last_trip(), Some(InterlockTrip::Undervoltage { .. })));
    assert_eq!(register(&supervisor, PUMP_PWM_OUTPUT), Some(RegisterValue::Duty(0)));
    assert_eq!(register(&supervisor, FAN_PWM_OUTPUT), Some(RegisterValue::Duty(0)));
}

#[test]
fn test_self_test_fails_when_driver_is_offline() {
    let bus = ScriptedBus {
        offline: true,
        ..ScriptedBus::default()
    };
    let params = Parameters::new(20.0, 25.0).unwrap();
    let mut supervisor = Supervisor::new(params, PlcHardware::new(bus), FixedOutputController::default());

    // Initialisation reads the inputs once
    assert!(matches!(
        supervisor.initialize(),
        Err(SupervisorError::Hardware(HardwareError::RegisterRead(_)))
    ));
    assert_eq!(supervisor.step(), SupervisorState::FatalError);
    assert!(supervisor.hardware().bus().registers.is_empty());
}

#[test]
fn test_null_bus_keeps_supervisor_idle() {
    let params = Parameters::new(12.0, 20.0).unwrap();
    let mut supervisor = Supervisor::new(params, PlcHardware::new(NullRegisterBus), FixedOutputController::default());
    supervisor.initialize().unwrap();
    for _ in 0..10 {
        supervisor.step();
    }
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert_eq!(supervisor.hardware().flush_count(), 9);
    let outputs = supervisor.hardware().current_outputs();
    assert_eq!(outputs.display.coolant_status, CoolantStatus::Dry);
}
