#[cfg(test)]
mod test_roundtrip {
    use approx::assert_relative_eq;
    use ratelaw::constants::ONE_ATM;
    use ratelaw::prelude::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> ParamMap {
        serde_json::from_value(value).unwrap()
    }

    fn cal_mol_units() -> UnitSystem {
        UnitSystemBuilder::default()
            .activation_energy(Units::parse("cal/mol").unwrap())
            .build()
            .unwrap()
    }

    fn si_rate_units() -> Units {
        UnitSystem::default().rate_units(2.0)
    }

    /// Emitted parameters reproduce the configured values after unit
    /// normalization: A unchanged, Ea converted from cal/mol to J/kmol.
    #[test]
    fn test_arrhenius_emission_normalizes_units() {
        let mut reaction = node(json!({
            "rate-constant": {"A": 38.7, "b": 2.7, "Ea": 6260.0},
        }));
        reaction.set_units(cal_mol_units());
        let rate = ArrheniusRate::from_parameters(&reaction, &si_rate_units()).unwrap();

        let out = rate.get_parameters(&si_rate_units());
        let coeffs = out.get_map("rate-constant").unwrap();
        assert_relative_eq!(coeffs.get_f64("A").unwrap(), 38.7, max_relative = 1e-12);
        assert_relative_eq!(coeffs.get_f64("b").unwrap(), 2.7, max_relative = 1e-12);
        assert_relative_eq!(
            coeffs.get_f64("Ea").unwrap(),
            6260.0 * 4184.0,
            max_relative = 1e-12
        );
    }

    /// Reconfiguring each variant from its own emission leaves evaluation
    /// unchanged.
    #[test]
    fn test_reconfigure_from_emission_is_stable() {
        let rate_units = si_rate_units();

        let mut reaction = node(json!({
            "rate-constant": {"A": 38.7, "b": 2.7, "Ea": 6260.0},
        }));
        reaction.set_units(cal_mol_units());
        let rate = ArrheniusRate::from_parameters(&reaction, &rate_units).unwrap();
        let again =
            ArrheniusRate::from_parameters(&rate.get_parameters(&rate_units), &rate_units).unwrap();
        let data = ArrheniusData::new(1350.0);
        assert_relative_eq!(rate.eval(&data), again.eval(&data), max_relative = 1e-12);

        let mut reaction = node(json!({
            "type": "falloff",
            "low-P-rate-constant": {"A": 2.3e12, "b": -0.9, "Ea": -1700.0},
            "high-P-rate-constant": {"A": 7.4e10, "b": -0.37, "Ea": 0.0},
            "Troe": {"A": 0.7346, "T3": 94.0, "T1": 1756.0, "T2": 5182.0},
            "efficiencies": {"AR": 0.7, "H2": 2.0, "H2O": 6.0},
        }));
        reaction.set_units(cal_mol_units());
        let rate = FalloffRate::from_parameters(&reaction, &rate_units).unwrap();
        let again =
            FalloffRate::from_parameters(&rate.get_parameters(&rate_units), &rate_units).unwrap();
        assert_eq!(rate.troe(), again.troe());
        assert_relative_eq!(
            rate.low_rate().activation_temperature(),
            again.low_rate().activation_temperature(),
            max_relative = 1e-12
        );
        assert_eq!(rate.efficiency("H2O"), again.efficiency("H2O"));
    }

    /// Plog pressures configured with atm suffixes come back in Pa.
    #[test]
    fn test_plog_round_trip() {
        let mut reaction = node(json!({
            "type": "pressure-dependent-Arrhenius",
            "rate-constants": [
                {"P": "0.01 atm", "A": 1.2124e13, "b": -0.5779, "Ea": 10872.7},
                {"P": "1.0 atm", "A": 4.9108e28, "b": -4.8507, "Ea": 24772.8},
            ],
        }));
        reaction.set_units(cal_mol_units());
        let rate = PlogRate::from_parameters(&reaction, &si_rate_units()).unwrap();

        let out = rate.get_parameters(&si_rate_units());
        assert_eq!(
            out.get("type").and_then(ParamValue::as_str),
            Some("pressure-dependent-Arrhenius")
        );
        let entries = out.get_sequence("rate-constants").unwrap();
        assert_eq!(entries.len(), 2);

        let first = entries[0].as_map().unwrap();
        assert_relative_eq!(
            first.get_f64("P").unwrap(),
            0.01 * ONE_ATM,
            max_relative = 1e-12
        );
        assert_relative_eq!(first.get_f64("A").unwrap(), 1.2124e13, max_relative = 1e-12);
        assert_relative_eq!(
            first.get_f64("Ea").unwrap(),
            10872.7 * 4184.0,
            max_relative = 1e-12
        );

        // the emitted node configures an identical rate
        let mut rate = rate;
        let mut again = PlogRate::from_parameters(&out, &si_rate_units()).unwrap();
        let data = PlogData::new(1000.0, 0.3 * ONE_ATM);
        rate.update(&data);
        again.update(&data);
        assert_relative_eq!(rate.eval(&data), again.eval(&data), max_relative = 1e-12);
    }

    /// Chebyshev coefficients and ranges survive emission untouched in an
    /// SI context.
    #[test]
    fn test_chebyshev_round_trip() {
        let reaction = node(json!({
            "type": "Chebyshev",
            "temperature-range": [290.0, 3000.0],
            "pressure-range": [100.0, 1.0e7],
            "data": [
                [8.2883, -1.1397],
                [1.9764, 1.0037],
            ],
        }));
        let rate = ChebyshevRate::try_from(&reaction).unwrap();

        let out = rate.get_parameters(&Units::dimensionless());
        let again = ChebyshevRate::try_from(&out).unwrap();
        assert_eq!(rate.coeffs(), again.coeffs());
        assert_eq!(rate.temperature_range(), again.temperature_range());
        assert_eq!(rate.pressure_range(), again.pressure_range());
    }

    /// The same physical activation energy configured in three different
    /// unit systems yields the same rate to within 1e-12.
    #[test]
    fn test_unit_invariance_of_activation_energy() {
        let rate_units = si_rate_units();
        let data = ArrheniusData::new(1000.0);

        let mut in_cal = node(json!({"rate-constant": {"A": 38.7, "b": 2.7, "Ea": 6260.0}}));
        in_cal.set_units(cal_mol_units());
        let k_cal = ArrheniusRate::from_parameters(&in_cal, &rate_units)
            .unwrap()
            .eval(&data);

        let mut in_joule =
            node(json!({"rate-constant": {"A": 38.7, "b": 2.7, "Ea": 26191.84}}));
        in_joule.set_units(
            UnitSystemBuilder::default()
                .activation_energy(Units::parse("J/mol").unwrap())
                .build()
                .unwrap(),
        );
        let k_joule = ArrheniusRate::from_parameters(&in_joule, &rate_units)
            .unwrap()
            .eval(&data);

        // an inline suffix overrides the document units entirely
        let with_suffix =
            node(json!({"rate-constant": {"A": 38.7, "b": 2.7, "Ea": "6260.0 cal/mol"}}));
        let k_suffix = ArrheniusRate::from_parameters(&with_suffix, &rate_units)
            .unwrap()
            .eval(&data);

        assert_relative_eq!(k_cal, k_joule, max_relative = 1e-12);
        assert_relative_eq!(k_cal, k_suffix, max_relative = 1e-12);
    }

    /// After linking, every mutator leaves the handle and the evaluator
    /// copy observably equal.
    #[test]
    fn test_linked_rate_stays_equal_to_evaluator_copy() {
        let rate_units = si_rate_units();
        let evaluator = MultiRate::<ArrheniusRate>::shared();
        let mut rate = ArrheniusRate::new(38.7, 2.7, 6260.0 * 4184.0);
        let index = link_rate(&mut rate, &evaluator);

        rate.set_pre_exponential_factor(77.4);
        rate.set_temperature_exponent(2.5);
        rate.set_activation_energy(3.0e7);

        let evaluator = evaluator.borrow();
        let copy = evaluator.rate(index).unwrap();
        assert_eq!(
            rate.get_parameters(&rate_units),
            copy.get_parameters(&rate_units)
        );
        let data = ArrheniusData::new(900.0);
        // identical mutations keep the pair bitwise equal
        assert_eq!(rate.eval(&data), copy.eval(&data));
    }

    /// A bare GRI-style A in cm^3/mol units lands in SI storage.
    #[test]
    fn test_cgs_molar_document_units() {
        let mut reaction = node(json!({
            "rate-constant": {"A": 3.87e4, "b": 2.7, "Ea": 6260.0},
        }));
        reaction.set_units(
            UnitSystemBuilder::default()
                .activation_energy(Units::parse("cal/mol").unwrap())
                .quantity(Units::parse("mol").unwrap())
                .length(Units::parse("cm").unwrap())
                .build()
                .unwrap(),
        );
        let rate = ArrheniusRate::from_parameters(&reaction, &si_rate_units()).unwrap();
        assert_relative_eq!(rate.pre_exponential_factor(), 38.7, max_relative = 1e-12);
    }
}
